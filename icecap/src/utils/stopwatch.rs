// Icecap: Verifying MPLS Networks under Link Failures
// Copyright (C) 2021  Tibor Schneider
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! An accumulating stopwatch.

use std::time::{Duration, Instant};

/// A stopwatch accumulating time over several start/stop intervals.
#[derive(Debug, Clone)]
pub struct Stopwatch {
    started: Option<Instant>,
    elapsed: Duration,
}

impl Stopwatch {
    /// Create a new stopwatch, optionally already running.
    pub fn new(running: bool) -> Self {
        Self { started: if running { Some(Instant::now()) } else { None }, elapsed: Duration::ZERO }
    }

    /// Start (or resume) the stopwatch.
    pub fn start(&mut self) {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
    }

    /// Stop the stopwatch, accumulating the elapsed interval.
    pub fn stop(&mut self) {
        if let Some(started) = self.started.take() {
            self.elapsed += started.elapsed();
        }
    }

    /// The accumulated duration in seconds.
    pub fn duration(&self) -> f64 {
        let mut elapsed = self.elapsed;
        if let Some(started) = self.started {
            elapsed += started.elapsed();
        }
        elapsed.as_secs_f64()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_accumulates() {
        let mut watch = Stopwatch::new(false);
        assert_eq!(watch.duration(), 0.0);
        watch.start();
        watch.stop();
        watch.start();
        watch.stop();
        assert!(watch.duration() >= 0.0);
        // stopping twice is harmless
        watch.stop();
    }
}
