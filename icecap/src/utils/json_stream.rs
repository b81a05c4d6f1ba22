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

//! Incremental writer for a JSON object, emitting one entry at a time so
//! results appear as soon as each query finishes.

use serde_json::Value;
use std::io::{self, Write};

/// Streams a JSON object `{"key": value, ...}` entry by entry. The closing
/// brace is written by [`JsonStream::close`] or on drop.
#[derive(Debug)]
pub struct JsonStream<W: Write> {
    out: W,
    started: bool,
    closed: bool,
}

impl<W: Write> JsonStream<W> {
    /// Create a stream writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out, started: false, closed: false }
    }

    /// Write one key/value entry.
    pub fn entry(&mut self, key: &str, value: &Value) -> io::Result<()> {
        if self.started {
            writeln!(self.out, ",")?;
        } else {
            writeln!(self.out, "{{")?;
            self.started = true;
        }
        write!(self.out, "    \"{}\" : {}", key, value)?;
        self.out.flush()
    }

    /// Close the object. Writes `{}` if no entry was ever written.
    pub fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if self.started {
            writeln!(self.out)?;
            writeln!(self.out, "}}")?;
        } else {
            writeln!(self.out, "{{}}")?;
        }
        self.out.flush()
    }
}

impl<W: Write> Drop for JsonStream<W> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stream_is_valid_json() {
        let mut buffer = Vec::new();
        {
            let mut stream = JsonStream::new(&mut buffer);
            stream.entry("Q1", &json!({"result": true})).unwrap();
            stream.entry("Q2", &json!({"result": null})).unwrap();
        }
        let value: Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["Q1"]["result"], json!(true));
        assert_eq!(value["Q2"]["result"], json!(null));
    }

    #[test]
    fn test_empty_stream() {
        let mut buffer = Vec::new();
        JsonStream::new(&mut buffer).close().unwrap();
        let value: Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value, json!({}));
    }
}
