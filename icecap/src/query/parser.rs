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

//! Parser for the textual query language.
//!
//! One query per line:
//!
//! ```text
//! <initial header> path <final header> k MODE
//! ```
//!
//! Header expressions are regexes over labels enclosed in `<...>`, e.g.
//! `<42 43>` or `<.>`. Path expressions are regexes over link atoms
//! `[From#To]`, where either side is a router name or `.`; a leading `^`
//! negates the atom and `.` alone matches any link. Both support grouping,
//! alternation `|` and the postfix operators `*`, `+` and `?`.

use crate::model::{InterfaceId, Label, Network};
use crate::query::{Mode, Nfa, Query};
use itertools::Itertools;
use thiserror::Error;

/// Errors raised while parsing a query string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryParseError {
    /// An unexpected character was encountered
    #[error("Unexpected character '{0}' at position {1}")]
    UnexpectedChar(char, usize),
    /// The query ended too early
    #[error("Unexpected end of query")]
    UnexpectedEnd,
    /// The failure bound is not a number
    #[error("Cannot parse failure bound: \"{0}\"")]
    BadFailureBound(String),
    /// The mode is not one of OVER, UNDER, DUAL, EXACT
    #[error("Unknown mode: \"{0}\"")]
    UnknownMode(String),
    /// A link atom refers to an unknown router
    #[error("Unknown router in link atom: \"{0}\"")]
    UnknownRouter(String),
    /// A header atom is not a valid label
    #[error("Invalid label in header expression: \"{0}\"")]
    BadLabel(String),
}

/// Parse all queries in `text`, one per line. Empty lines and lines starting
/// with `#` are skipped. Returns each query together with its source line.
pub fn parse_queries(
    network: &Network,
    text: &str,
) -> Result<Vec<(String, Query)>, QueryParseError> {
    let mut queries = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        queries.push((line.to_string(), parse_query(network, line)?));
    }
    Ok(queries)
}

/// Parse a single query line.
pub fn parse_query(network: &Network, line: &str) -> Result<Query, QueryParseError> {
    let mut p = Parser { network, chars: line.char_indices().peekable(), input: line };
    let mut prestack = p.parse_header()?;
    let mut path = p.parse_path()?;
    let mut poststack = p.parse_header()?;
    let failures = p.parse_failures()?;
    let mode = p.parse_mode()?;
    p.skip_ws();
    if let Some((pos, c)) = p.chars.next() {
        return Err(QueryParseError::UnexpectedChar(c, pos));
    }
    prestack.finalize();
    path.finalize();
    poststack.finalize();
    Ok(Query::new(prestack, path, poststack, failures, mode))
}

struct Parser<'a> {
    network: &'a Network,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    input: &'a str,
}

impl<'a> Parser<'a> {
    fn skip_ws(&mut self) {
        while matches!(self.chars.peek(), Some((_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), QueryParseError> {
        self.skip_ws();
        match self.chars.next() {
            Some((_, c)) if c == expected => Ok(()),
            Some((pos, c)) => Err(QueryParseError::UnexpectedChar(c, pos)),
            None => Err(QueryParseError::UnexpectedEnd),
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn parse_word(&mut self) -> Result<String, QueryParseError> {
        self.skip_ws();
        let mut word = String::new();
        while matches!(self.peek_char(), Some(c) if c.is_alphanumeric() || c == '_' || c == '-') {
            word.push(self.chars.next().unwrap().1);
        }
        if word.is_empty() {
            match self.chars.next() {
                Some((pos, c)) => return Err(QueryParseError::UnexpectedChar(c, pos)),
                None => return Err(QueryParseError::UnexpectedEnd),
            }
        }
        Ok(word)
    }

    fn parse_failures(&mut self) -> Result<usize, QueryParseError> {
        let word = self.parse_word()?;
        word.parse().map_err(|_| QueryParseError::BadFailureBound(word))
    }

    fn parse_mode(&mut self) -> Result<Mode, QueryParseError> {
        let word = self.parse_word()?;
        match word.as_str() {
            "OVER" => Ok(Mode::Over),
            "UNDER" => Ok(Mode::Under),
            "DUAL" => Ok(Mode::Dual),
            "EXACT" => Ok(Mode::Exact),
            _ => Err(QueryParseError::UnknownMode(word)),
        }
    }

    // ---------------
    // Header regexes
    // ---------------

    fn parse_header(&mut self) -> Result<Nfa<Label>, QueryParseError> {
        self.expect('<')?;
        self.skip_ws();
        if self.peek_char() == Some('>') {
            self.chars.next();
            return Ok(Nfa::epsilon());
        }
        let nfa = self.parse_header_alt()?;
        self.expect('>')?;
        Ok(nfa)
    }

    fn parse_header_alt(&mut self) -> Result<Nfa<Label>, QueryParseError> {
        let mut nfa = self.parse_header_cat()?;
        loop {
            self.skip_ws();
            if self.peek_char() == Some('|') {
                self.chars.next();
                nfa = nfa.union(self.parse_header_cat()?);
            } else {
                return Ok(nfa);
            }
        }
    }

    fn parse_header_cat(&mut self) -> Result<Nfa<Label>, QueryParseError> {
        let mut nfa = self.parse_header_postfix()?;
        loop {
            self.skip_ws();
            match self.peek_char() {
                Some('.') | Some('(') => nfa = nfa.concat(self.parse_header_postfix()?),
                Some(c) if c.is_alphanumeric() => nfa = nfa.concat(self.parse_header_postfix()?),
                _ => return Ok(nfa),
            }
        }
    }

    fn parse_header_postfix(&mut self) -> Result<Nfa<Label>, QueryParseError> {
        let mut nfa = self.parse_header_atom()?;
        loop {
            match self.peek_char() {
                Some('*') => {
                    self.chars.next();
                    nfa = nfa.star();
                }
                Some('+') => {
                    self.chars.next();
                    nfa = nfa.plus();
                }
                Some('?') => {
                    self.chars.next();
                    nfa = nfa.optional();
                }
                _ => return Ok(nfa),
            }
        }
    }

    fn parse_header_atom(&mut self) -> Result<Nfa<Label>, QueryParseError> {
        self.skip_ws();
        match self.peek_char() {
            Some('.') => {
                self.chars.next();
                Ok(Nfa::wildcard())
            }
            Some('(') => {
                self.chars.next();
                let nfa = self.parse_header_alt()?;
                self.expect(')')?;
                Ok(nfa)
            }
            _ => {
                let word = self.parse_word()?;
                let label =
                    Label::parse(&word).map_err(|_| QueryParseError::BadLabel(word.clone()))?;
                Ok(Nfa::literal(vec![label], false))
            }
        }
    }

    // -------------
    // Path regexes
    // -------------

    fn parse_path(&mut self) -> Result<Nfa<InterfaceId>, QueryParseError> {
        self.skip_ws();
        if self.peek_char() == Some('<') {
            // empty path expression
            return Ok(Nfa::epsilon());
        }
        self.parse_path_alt()
    }

    fn parse_path_alt(&mut self) -> Result<Nfa<InterfaceId>, QueryParseError> {
        let mut nfa = self.parse_path_cat()?;
        loop {
            self.skip_ws();
            if self.peek_char() == Some('|') {
                self.chars.next();
                nfa = nfa.union(self.parse_path_cat()?);
            } else {
                return Ok(nfa);
            }
        }
    }

    fn parse_path_cat(&mut self) -> Result<Nfa<InterfaceId>, QueryParseError> {
        let mut nfa = self.parse_path_postfix()?;
        loop {
            self.skip_ws();
            match self.peek_char() {
                Some('.') | Some('[') | Some('(') => {
                    nfa = nfa.concat(self.parse_path_postfix()?)
                }
                _ => return Ok(nfa),
            }
        }
    }

    fn parse_path_postfix(&mut self) -> Result<Nfa<InterfaceId>, QueryParseError> {
        let mut nfa = self.parse_path_atom()?;
        loop {
            match self.peek_char() {
                Some('*') => {
                    self.chars.next();
                    nfa = nfa.star();
                }
                Some('+') => {
                    self.chars.next();
                    nfa = nfa.plus();
                }
                Some('?') => {
                    self.chars.next();
                    nfa = nfa.optional();
                }
                _ => return Ok(nfa),
            }
        }
    }

    fn parse_path_atom(&mut self) -> Result<Nfa<InterfaceId>, QueryParseError> {
        self.skip_ws();
        match self.peek_char() {
            Some('.') => {
                self.chars.next();
                Ok(Nfa::wildcard())
            }
            Some('(') => {
                self.chars.next();
                let nfa = self.parse_path_alt()?;
                self.expect(')')?;
                Ok(nfa)
            }
            Some('[') => {
                self.chars.next();
                self.skip_ws();
                let negated = if self.peek_char() == Some('^') {
                    self.chars.next();
                    true
                } else {
                    false
                };
                let from = self.parse_link_part()?;
                self.expect('#')?;
                let to = self.parse_link_part()?;
                self.expect(']')?;
                let symbols = self.resolve_link_atom(&from, &to)?;
                Ok(Nfa::literal(symbols, negated))
            }
            Some(c) => {
                let pos = self.chars.peek().map(|(p, _)| *p).unwrap_or(self.input.len());
                Err(QueryParseError::UnexpectedChar(c, pos))
            }
            None => Err(QueryParseError::UnexpectedEnd),
        }
    }

    fn parse_link_part(&mut self) -> Result<Option<String>, QueryParseError> {
        self.skip_ws();
        if self.peek_char() == Some('.') {
            self.chars.next();
            Ok(None)
        } else {
            Ok(Some(self.parse_word()?))
        }
    }

    /// All interfaces leaving a router matching `from` towards a router
    /// matching `to`, by global id. `None` matches every router.
    fn resolve_link_atom(
        &self,
        from: &Option<String>,
        to: &Option<String>,
    ) -> Result<Vec<InterfaceId>, QueryParseError> {
        for name in [from, to].iter().filter_map(|n| n.as_ref()) {
            if self.network.find_router(name).is_none() {
                return Err(QueryParseError::UnknownRouter(name.clone()));
            }
        }
        Ok(self
            .network
            .interfaces()
            .filter(|inf| match from {
                Some(name) => self.network.router(inf.router()).has_name(name),
                None => true,
            })
            .filter(|inf| match to {
                Some(name) => {
                    self.network.router(self.network.target_router(inf.global_id())).has_name(name)
                }
                None => true,
            })
            .map(|inf| inf.global_id())
            .sorted()
            .dedup()
            .collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn test_net() -> Network {
        Network::make_network(
            &["R0", "R1"],
            &[&["iR0", "R1"], &["R0", "iR1"]],
        )
    }

    #[test]
    fn test_parse_simple_query() {
        let net = test_net();
        let q = parse_query(&net, "<.> [.#R0] [R0#R1] [R1#.] <.> 0 OVER").unwrap();
        assert_eq!(q.failures(), 0);
        assert_eq!(q.mode(), Mode::Over);
        // [R0#R1] resolves to exactly the interface from R0 towards R1
        let r0 = net.find_router("R0").unwrap();
        let r0_to_r1 = net.router(r0).find_interface("R1").unwrap().global_id();
        let q = parse_query(&net, "<42> [R0#R1] <43> 2 DUAL").unwrap();
        let start = q.path().initial_closure().to_vec();
        let edge_symbols: Vec<_> = start
            .iter()
            .flat_map(|s| q.path().edges(*s))
            .flat_map(|e| e.symbols.iter().copied())
            .collect();
        assert_eq!(edge_symbols, vec![r0_to_r1]);
        assert_eq!(q.failures(), 2);
        assert_eq!(q.mode(), Mode::Dual);
    }

    #[test]
    fn test_parse_header_regex() {
        let net = test_net();
        assert!(parse_query(&net, "<42 (43 | 44)* ip> .* <.> 1 UNDER").is_ok());
        assert!(parse_query(&net, "<> .* <> 0 EXACT").is_ok());
    }

    #[test]
    fn test_parse_errors() {
        let net = test_net();
        assert_eq!(
            parse_query(&net, "<.> [.#Nowhere] <.> 0 OVER"),
            Err(QueryParseError::UnknownRouter("Nowhere".to_string()))
        );
        assert!(matches!(
            parse_query(&net, "<.> .* <.> x OVER"),
            Err(QueryParseError::BadFailureBound(_))
        ));
        assert!(matches!(
            parse_query(&net, "<.> .* <.> 0 SOMETIMES"),
            Err(QueryParseError::UnknownMode(_))
        ));
    }
}
