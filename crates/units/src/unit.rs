//! Compound unit strings.
//!
//! Accepts the spellings surveys actually use: `erg/s/cm^2/Hz`,
//! `erg s-1 cm-2 Hz-1`, `erg / (s cm2 Hz)`, `mJy`, `ct/s`, `keV`, `GHz`,
//! `Angstrom`. A unit parses into an SI scale factor and a dimension vector;
//! callers classify it from there.

use std::ops::{Div, Mul};

use crate::constants::{ANGSTROM_M, ELECTRON_VOLT_J, ERG_J};
use crate::error::{UnitError, UnitResult};

/// Exponents over the base quantities the conversions care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dims {
    pub energy: i32,
    pub length: i32,
    pub time: i32,
    pub photon: i32,
    pub count: i32,
}

impl Dims {
    pub const NONE: Dims = Dims::new(0, 0, 0, 0, 0);
    pub const LENGTH: Dims = Dims::new(0, 1, 0, 0, 0);
    pub const FREQUENCY: Dims = Dims::new(0, 0, -1, 0, 0);
    pub const ENERGY: Dims = Dims::new(1, 0, 0, 0, 0);

    pub const fn new(energy: i32, length: i32, time: i32, photon: i32, count: i32) -> Self {
        Self {
            energy,
            length,
            time,
            photon,
            count,
        }
    }

    fn pow(self, n: i32) -> Self {
        Self::new(
            self.energy * n,
            self.length * n,
            self.time * n,
            self.photon * n,
            self.count * n,
        )
    }
}

/// A parsed unit: `value [unit] = value * scale [SI of dims]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unit {
    pub scale: f64,
    pub dims: Dims,
}

impl Unit {
    pub const fn new(scale: f64, dims: Dims) -> Self {
        Self { scale, dims }
    }

    pub fn parse(s: &str) -> UnitResult<Unit> {
        let tokens = tokenize(s).ok_or_else(|| UnitError::Parse(s.to_string()))?;
        if tokens.is_empty() {
            return Err(UnitError::Parse(s.to_string()));
        }
        let mut parser = Parser { tokens, pos: 0 };
        let unit = parser
            .product()
            .ok_or_else(|| UnitError::Parse(s.to_string()))?;
        if parser.pos != parser.tokens.len() {
            return Err(UnitError::Parse(s.to_string()));
        }
        Ok(unit)
    }

    fn powi(self, n: i32) -> Self {
        Self::new(self.scale.powi(n), self.dims.pow(n))
    }
}

impl Mul for Unit {
    type Output = Unit;

    fn mul(self, rhs: Unit) -> Unit {
        Unit::new(
            self.scale * rhs.scale,
            Dims::new(
                self.dims.energy + rhs.dims.energy,
                self.dims.length + rhs.dims.length,
                self.dims.time + rhs.dims.time,
                self.dims.photon + rhs.dims.photon,
                self.dims.count + rhs.dims.count,
            ),
        )
    }
}

impl Div for Unit {
    type Output = Unit;

    fn div(self, rhs: Unit) -> Unit {
        self * rhs.powi(-1)
    }
}

// ---------------------------------------------------------------------------
// Symbols
// ---------------------------------------------------------------------------

fn base_symbol(sym: &str) -> Option<Unit> {
    let e = Dims::ENERGY;
    let l = Dims::LENGTH;
    let t = Dims::new(0, 0, 1, 0, 0);
    let unit = match sym {
        "erg" => Unit::new(ERG_J, e),
        "J" => Unit::new(1.0, e),
        "eV" => Unit::new(ELECTRON_VOLT_J, e),
        "W" => Unit::new(1.0, Dims::new(1, 0, -1, 0, 0)),
        "m" => Unit::new(1.0, l),
        "AA" | "Angstrom" | "angstrom" | "Å" => Unit::new(ANGSTROM_M, l),
        "micron" => Unit::new(1e-6, l),
        "pc" => Unit::new(3.085_677_581_491_367e16, l),
        "s" | "sec" => Unit::new(1.0, t),
        "min" => Unit::new(60.0, t),
        "h" | "hr" => Unit::new(3600.0, t),
        "d" | "day" => Unit::new(86_400.0, t),
        "Hz" => Unit::new(1.0, Dims::FREQUENCY),
        "Jy" => Unit::new(1e-26, Dims::new(1, -2, 0, 0, 0)),
        "ct" | "count" | "counts" => Unit::new(1.0, Dims::new(0, 0, 0, 0, 1)),
        "ph" | "photon" | "photons" => Unit::new(1.0, Dims::new(0, 0, 0, 1, 0)),
        // synphot-style composite names
        "photlam" => Unit::new(1e14, Dims::new(0, -3, -1, 1, 0)),
        "photnu" => Unit::new(1e4, Dims::new(0, -2, 0, 1, 0)),
        "flam" => Unit::new(1e7, Dims::new(1, -3, -1, 0, 0)),
        "fnu" => Unit::new(1e-3, Dims::new(1, -2, 0, 0, 0)),
        _ => return None,
    };
    Some(unit)
}

const PREFIXABLE: &[&str] = &["Hz", "Jy", "eV", "m", "J", "W", "pc", "s"];

fn prefix_scale(c: char) -> Option<f64> {
    Some(match c {
        'T' => 1e12,
        'G' => 1e9,
        'M' => 1e6,
        'k' => 1e3,
        'c' => 1e-2,
        'm' => 1e-3,
        'u' | 'µ' | 'μ' => 1e-6,
        'n' => 1e-9,
        'p' => 1e-12,
        _ => return None,
    })
}

fn symbol(sym: &str) -> Option<Unit> {
    if let Some(u) = base_symbol(sym) {
        return Some(u);
    }
    let mut chars = sym.chars();
    let first = chars.next()?;
    let rest = chars.as_str();
    if !PREFIXABLE.contains(&rest) {
        return None;
    }
    let scale = prefix_scale(first)?;
    base_symbol(rest).map(|u| Unit::new(u.scale * scale, u.dims))
}

// ---------------------------------------------------------------------------
// Tokenizer + parser
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Int(i32),
    Slash,
    Star,
    Caret,
    LParen,
    RParen,
}

fn tokenize(s: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '.' => i += 1,
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                tokens.push(Token::Caret);
                i += 2;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '^' => {
                tokens.push(Token::Caret);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '-' | '+' | '0'..='9' => {
                let start = i;
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                tokens.push(Token::Int(text.parse().ok()?));
            }
            c if c.is_alphabetic() => {
                let start = i;
                while i < chars.len() && chars[i].is_alphabetic() {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            _ => return None,
        }
    }
    Some(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        t
    }

    fn product(&mut self) -> Option<Unit> {
        let mut acc = self.power()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    acc = acc * self.power()?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    acc = acc / self.power()?;
                }
                Some(Token::Ident(_)) | Some(Token::LParen) => {
                    acc = acc * self.power()?;
                }
                _ => return Some(acc),
            }
        }
    }

    fn power(&mut self) -> Option<Unit> {
        let base = self.primary()?;
        match self.peek() {
            Some(Token::Caret) => {
                self.pos += 1;
                match self.next()? {
                    Token::Int(n) => Some(base.powi(n)),
                    _ => None,
                }
            }
            Some(Token::Int(n)) => {
                let n = *n;
                self.pos += 1;
                Some(base.powi(n))
            }
            _ => Some(base),
        }
    }

    fn primary(&mut self) -> Option<Unit> {
        match self.next()? {
            Token::Ident(sym) => symbol(&sym),
            Token::LParen => {
                let inner = self.product()?;
                match self.next()? {
                    Token::RParen => Some(inner),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn spellings_of_fnu_agree() {
        let a = Unit::parse("erg/s/cm^2/Hz").unwrap();
        let b = Unit::parse("erg s-1 cm-2 Hz-1").unwrap();
        let c = Unit::parse("erg / (s cm2 Hz)").unwrap();
        let d = Unit::parse("erg cm**-2 s**-1 Hz**-1").unwrap();
        for u in [b, c, d] {
            assert_eq!(u.dims, a.dims);
            assert_relative_eq!(u.scale, a.scale, max_relative = 1e-12);
        }
        assert_relative_eq!(a.scale, 1e-3, max_relative = 1e-12);
        assert_eq!(a.dims, Dims::new(1, -2, 0, 0, 0));
    }

    #[test]
    fn jansky_is_fnu() {
        let mjy = Unit::parse("mJy").unwrap();
        let fnu = Unit::parse("erg/s/cm2/Hz").unwrap();
        assert_eq!(mjy.dims, fnu.dims);
        assert_relative_eq!(mjy.scale / fnu.scale, 1e-26, max_relative = 1e-12);
    }

    #[test]
    fn prefixes() {
        assert_relative_eq!(Unit::parse("GHz").unwrap().scale, 1e9);
        assert_relative_eq!(Unit::parse("keV").unwrap().scale, 1.602_176_634e-16);
        assert_relative_eq!(Unit::parse("nm").unwrap().scale, 1e-9);
        assert_relative_eq!(Unit::parse("uJy").unwrap().scale, 1e-32, max_relative = 1e-12);
        assert_eq!(Unit::parse("Angstrom").unwrap().dims, Dims::LENGTH);
    }

    #[test]
    fn rejects_unknown_spellings() {
        assert!(Unit::parse("ergs/s/cm^2/Hz").is_err());
        assert!(Unit::parse("AB").is_err());
        assert!(Unit::parse("").is_err());
        assert!(Unit::parse("erg/(s").is_err());
    }
}
