//! Recursive-descent parser for the definition language.
//!
//! The parser never stops at the first problem. Syntax errors are reported
//! at the offending token, after which tokens are skipped up to the next
//! `,`, `;` or section keyword. Semantic errors reject the declaration they
//! belong to and leave the network untouched.

use std::collections::HashSet;

use log::{debug, trace};

use super::diagnostic::{Diagnostic, DiagnosticKind};
use super::lexer::{Keyword, Position, Scanner, Token, TokenKind};
use super::Definition;
use crate::devices::DeviceKind;
use crate::error::{MonitorError, NetworkError};
use crate::monitors::{MonitorPoint, Monitors};
use crate::names::Name;
use crate::network::{unbound_inputs, DeviceId, InputPin, Network, OutputRef, Pin};

/// Sections of a definition, in the order they must appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Section {
    Devices,
    Connect,
    Monitor,
}

impl Section {
    fn keyword(self) -> &'static str {
        match self {
            Section::Devices => "DEVICES",
            Section::Connect => "CONNECT",
            Section::Monitor => "MONITOR",
        }
    }
}

/// A `device[.pin]` reference as written, before resolution.
#[derive(Debug, Clone, Copy)]
struct PinRef {
    device: Name,
    pin: Option<Name>,
    position: Position,
}

/// Parser for definitions.
pub struct Parser<'a> {
    scanner: Scanner<'a>,
    current: Token,
    network: Network,
    monitors: Monitors,
    diagnostics: Vec<Diagnostic>,
    /// Section being parsed
    section: Option<Section>,
    /// Last section opened, for ordering checks
    last_section: Option<Section>,
    /// Devices that were the destination of a rejected connection
    implicated: HashSet<DeviceId>,
    /// A connection was lost to a syntax error
    connect_incomplete: bool,
    /// Declaration position of each device, indexed by `DeviceId`
    declared_at: Vec<Position>,
}

impl<'a> Parser<'a> {
    /// Create a new parser with the given scanner.
    pub fn new(mut scanner: Scanner<'a>) -> Self {
        let current = scanner.next_token();
        Self {
            scanner,
            current,
            network: Network::new(),
            monitors: Monitors::new(),
            diagnostics: Vec::new(),
            section: None,
            last_section: None,
            implicated: HashSet::new(),
            connect_incomplete: false,
            declared_at: Vec::new(),
        }
    }

    /// Parse the entire definition, collecting every diagnostic.
    pub fn parse(mut self) -> Definition {
        if self.current.is_eof() {
            self.report(Diagnostic::semantic(
                self.current.position,
                "definition is empty",
            ));
        } else {
            self.parse_sections();
            self.check_unbound_inputs();
            if !self.diagnostics.iter().any(Diagnostic::is_error) {
                self.check_unused_devices();
            }
        }

        debug!(
            "parsed {} device(s), {} connection(s), {} monitor(s), {} diagnostic(s)",
            self.network.len(),
            self.network.connections().len(),
            self.monitors.len(),
            self.diagnostics.len()
        );

        Definition {
            names: self.scanner.into_names(),
            network: self.network,
            monitors: self.monitors,
            diagnostics: self.diagnostics,
        }
    }

    // ============ Token Handling ============

    fn advance(&mut self) {
        self.current = self.scanner.next_token();
    }

    fn is_boundary(&self) -> bool {
        self.current.is_eof() || self.current.is_section_keyword()
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<(), Diagnostic> {
        if self.current.kind == kind {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn expect_name(&mut self, what: &str) -> Result<Name, Diagnostic> {
        match self.current.kind {
            TokenKind::Name(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected(what)),
        }
    }

    /// Syntax error at the current token.
    fn unexpected(&self, expected: &str) -> Diagnostic {
        let message = match &self.current.kind {
            TokenKind::Invalid(ch) => format!("unexpected character '{}'", ch),
            TokenKind::UnterminatedComment => "unterminated block comment".to_string(),
            _ => format!("expected {}, found {}", expected, self.describe(&self.current)),
        };
        Diagnostic::syntax(self.current.position, message)
    }

    fn describe(&self, token: &Token) -> String {
        match &token.kind {
            TokenKind::Keyword(keyword) => format!("keyword {}", keyword),
            TokenKind::Name(name) => format!("name `{}`", self.scanner.names().display(*name)),
            TokenKind::Number(text) => format!("number {}", text),
            TokenKind::Comma => "','".to_string(),
            TokenKind::Semicolon => "';'".to_string(),
            TokenKind::Colon => "':'".to_string(),
            TokenKind::Arrow => "'>'".to_string(),
            TokenKind::Dot => "'.'".to_string(),
            TokenKind::Invalid(ch) => format!("'{}'", ch),
            TokenKind::UnterminatedComment => "unterminated comment".to_string(),
            TokenKind::Eof => "end of file".to_string(),
        }
    }

    /// Record a diagnostic, dropping it if the previous one is of the same
    /// kind at the same position.
    fn report(&mut self, diagnostic: Diagnostic) {
        if self
            .diagnostics
            .last()
            .is_some_and(|last| last.position == diagnostic.position && last.kind == diagnostic.kind)
        {
            trace!("dropping follow-on diagnostic: {}", diagnostic);
            return;
        }
        if diagnostic.kind == DiagnosticKind::Syntax && self.section == Some(Section::Connect) {
            self.connect_incomplete = true;
        }
        self.diagnostics.push(diagnostic);
    }

    fn semantic(&mut self, position: Position, message: impl Into<String>) {
        self.report(Diagnostic::semantic(position, message));
    }

    /// Skip to the next `,`, `;`, section keyword or end of file.
    fn recover(&mut self) {
        while !matches!(self.current.kind, TokenKind::Comma | TokenKind::Semicolon) && !self.is_boundary() {
            self.advance();
        }
    }

    // ============ Sections ============

    fn parse_sections(&mut self) {
        loop {
            let section = match self.current.kind {
                TokenKind::Keyword(Keyword::Devices) => Section::Devices,
                TokenKind::Keyword(Keyword::Connect) => Section::Connect,
                TokenKind::Keyword(Keyword::Monitor) => Section::Monitor,
                TokenKind::Keyword(Keyword::End) => {
                    if self.last_section.is_none() {
                        let diagnostic = self.unexpected("DEVICES");
                        self.report(diagnostic);
                    }
                    self.advance();
                    if !self.current.is_eof() {
                        let diagnostic = self.unexpected("end of file after END");
                        self.report(diagnostic);
                    }
                    return;
                }
                TokenKind::Eof => {
                    let diagnostic = self.unexpected("END");
                    self.report(diagnostic);
                    return;
                }
                _ => {
                    let diagnostic = self.unexpected("a section keyword");
                    self.report(diagnostic);
                    while !self.is_boundary() {
                        self.advance();
                    }
                    continue;
                }
            };
            self.parse_section(section);
        }
    }

    fn parse_section(&mut self, section: Section) {
        let position = self.current.position;
        match self.last_section {
            Some(last) if section <= last => {
                self.report(Diagnostic::syntax(
                    position,
                    format!("{} section is repeated or out of order", section.keyword()),
                ));
            }
            None if section != Section::Devices => {
                self.report(Diagnostic::syntax(
                    position,
                    format!("expected DEVICES, found keyword {}", section.keyword()),
                ));
            }
            _ => {}
        }
        self.last_section = Some(section);
        self.section = Some(section);
        self.advance();

        trace!("entering {} section", section.keyword());
        match section {
            Section::Devices => self.parse_list(Self::device_decl),
            Section::Connect | Section::Monitor if self.current.kind == TokenKind::Semicolon => {
                self.advance();
            }
            Section::Connect => self.parse_list(Self::connection_decl),
            Section::Monitor => self.parse_list(Self::monitor_decl),
        }
        self.section = None;
    }

    /// Parse `item (, item)* ;`, recovering from syntax errors in items.
    fn parse_list(&mut self, item: fn(&mut Self) -> Result<(), Diagnostic>) {
        loop {
            let mut recovered = false;
            if let Err(diagnostic) = item(self) {
                self.report(diagnostic);
                self.recover();
                recovered = true;
            }
            loop {
                match self.current.kind {
                    TokenKind::Comma => {
                        self.advance();
                        break;
                    }
                    TokenKind::Semicolon => {
                        self.advance();
                        return;
                    }
                    _ if self.is_boundary() => {
                        if !recovered {
                            let diagnostic = self.unexpected("';'");
                            self.report(diagnostic);
                        }
                        return;
                    }
                    _ => {
                        let diagnostic = self.unexpected("',' or ';'");
                        self.report(diagnostic);
                        self.recover();
                        recovered = true;
                    }
                }
            }
        }
    }

    // ============ Declarations ============

    /// `name : kind [qualifier]`
    fn device_decl(&mut self) -> Result<(), Diagnostic> {
        let position = self.current.position;
        let name = self.expect_name("a device name")?;
        self.expect(TokenKind::Colon, "':'")?;

        let kind_position = self.current.position;
        let device_type = match self.current.kind {
            TokenKind::Keyword(Keyword::Device(device_type)) => {
                self.advance();
                device_type
            }
            TokenKind::Name(kind) => {
                self.advance();
                if matches!(self.current.kind, TokenKind::Number(_)) {
                    self.advance();
                }
                let text = self.scanner.names().display(kind);
                self.semantic(kind_position, format!("`{}` is not a device kind", text));
                return Ok(());
            }
            _ => return Err(self.unexpected("a device kind")),
        };

        // A missing qualifier is reported against the kind
        let (qualifier, qualifier_position) = match &self.current.kind {
            TokenKind::Number(text) => (Some(text.clone()), self.current.position),
            TokenKind::Invalid(_) | TokenKind::UnterminatedComment => {
                return Err(self.unexpected("a qualifier"));
            }
            _ => (None, kind_position),
        };
        if qualifier.is_some() {
            self.advance();
        }

        let kind = match DeviceKind::from_declaration(device_type, qualifier.as_deref()) {
            Ok(kind) => kind,
            Err(err) => {
                let text = self.scanner.names().display(name);
                self.semantic(qualifier_position, format!("`{}`: {}", text, err));
                return Ok(());
            }
        };

        match self.network.add_device(name, kind) {
            Ok(id) => {
                debug_assert_eq!(id.0, self.declared_at.len());
                self.declared_at.push(position);
                trace!("declared {} as {}", self.scanner.names().display(name), device_type);
            }
            Err(err) => {
                let text = self.scanner.names().display(name);
                self.semantic(position, format!("`{}`: {}", text, err));
            }
        }
        Ok(())
    }

    /// `device[.pin]`
    fn pin_ref(&mut self) -> Result<PinRef, Diagnostic> {
        let position = self.current.position;
        let device = self.expect_name("a device name")?;
        let pin = if self.current.kind == TokenKind::Dot {
            self.advance();
            Some(self.expect_name("a pin name")?)
        } else {
            None
        };
        Ok(PinRef {
            device,
            pin,
            position,
        })
    }

    /// `source > destination`
    fn connection_decl(&mut self) -> Result<(), Diagnostic> {
        let source = self.pin_ref()?;
        self.expect(TokenKind::Arrow, "'>'")?;
        let destination = self.pin_ref()?;

        let result = self.resolve_source(&source).and_then(|driver| {
            let (id, pin) = self.resolve_destination(&destination).map_err(|err| (destination, err))?;
            self.network
                .make_connection(driver, id, pin)
                .map_err(|err| (destination, err))
        });

        if let Err((at, err)) = result {
            if let Some(id) = self.network.device_id(destination.device) {
                self.implicated.insert(id);
            }
            let message = format!("`{}`: {}", self.ref_text(&at), err);
            self.semantic(at.position, message);
        }
        Ok(())
    }

    /// `device[.pin]`, naming an output
    fn monitor_decl(&mut self) -> Result<(), Diagnostic> {
        let point_ref = self.pin_ref()?;
        let result = match self.resolve_source(&point_ref) {
            Ok(output) => self
                .monitors
                .add(MonitorPoint::new(point_ref.device, output.pin), &self.network)
                .map_err(|err| err.to_string()),
            Err((_, NetworkError::DeviceAbsent)) => Err(MonitorError::DeviceAbsent.to_string()),
            Err((_, NetworkError::InputToInput)) => Err(MonitorError::NotOutput.to_string()),
            Err((_, err)) => Err(err.to_string()),
        };
        if let Err(message) = result {
            let message = format!("`{}`: {}", self.ref_text(&point_ref), message);
            self.semantic(point_ref.position, message);
        }
        Ok(())
    }

    // ============ Resolution ============

    fn ref_text(&self, pin_ref: &PinRef) -> String {
        let names = self.scanner.names();
        match pin_ref.pin {
            Some(pin) => format!("{}.{}", names.display(pin_ref.device), names.display(pin)),
            None => names.display(pin_ref.device),
        }
    }

    /// Device and optional pin of a reference.
    fn lookup(&self, pin_ref: &PinRef) -> Result<(DeviceId, Option<Pin>), NetworkError> {
        let id = self
            .network
            .device_id(pin_ref.device)
            .ok_or(NetworkError::DeviceAbsent)?;
        let pin = match pin_ref.pin {
            Some(pin) => {
                let text = self.scanner.names().get_name_string(pin).unwrap_or("");
                Some(Pin::from_name(text).ok_or(NetworkError::PortAbsent)?)
            }
            None => None,
        };
        Ok((id, pin))
    }

    fn resolve_source(&self, pin_ref: &PinRef) -> Result<OutputRef, (PinRef, NetworkError)> {
        let resolve = || {
            let (id, pin) = self.lookup(pin_ref)?;
            Ok(OutputRef::new(id, self.network.resolve_output(id, pin)?))
        };
        resolve().map_err(|err| (*pin_ref, err))
    }

    fn resolve_destination(&self, pin_ref: &PinRef) -> Result<(DeviceId, InputPin), NetworkError> {
        let (id, pin) = self.lookup(pin_ref)?;
        Ok((id, self.network.resolve_input(id, pin)?))
    }

    // ============ Whole-network Checks ============

    fn check_unbound_inputs(&mut self) {
        if self.connect_incomplete {
            debug!("skipping unbound input check after CONNECT syntax errors");
            return;
        }
        let mut by_device: Vec<(DeviceId, Vec<InputPin>)> = Vec::new();
        for (id, pin) in unbound_inputs(&self.network) {
            if self.implicated.contains(&id) {
                continue;
            }
            match by_device.last_mut() {
                Some((last, pins)) if *last == id => pins.push(pin),
                _ => by_device.push((id, vec![pin])),
            }
        }
        for (id, pins) in by_device {
            let name = self.scanner.names().display(self.network.device(id).name);
            let pins: Vec<String> = pins.iter().map(|pin| pin.to_string()).collect();
            let message = if pins.len() == 1 {
                format!("`{}`: input {} is not connected", name, pins[0])
            } else {
                format!("`{}`: inputs {} are not connected", name, pins.join(", "))
            };
            self.semantic(self.declared_at[id.0], message);
        }
    }

    fn check_unused_devices(&mut self) {
        let monitored: HashSet<Name> = self.monitors.points().map(|point| point.device).collect();
        let ids: Vec<DeviceId> = self.network.device_ids().collect();
        for id in ids {
            let device = self.network.device(id);
            if self.network.fanout(id) == 0 && !monitored.contains(&device.name) {
                let name = self.scanner.names().display(device.name);
                self.report(Diagnostic::warning(
                    self.declared_at[id.0],
                    format!("`{}` drives nothing and is not monitored", name),
                ));
            }
        }
    }
}
