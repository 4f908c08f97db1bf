use arm11_rs::condition::Condition;
use arm11_rs::instructions::{lookup, InstrDesc};

/// Category of a single source token, carrying whatever it resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// `name:`; holds the name without the colon
    Label(&'a str),
    Instruction(InstrDesc, Condition),
    /// `#expr`
    ImmediateHash(i64),
    /// `=expr`
    ImmediateEquals(i64),
    /// `r0`..`r16`, `sp`, `lr`, `pc`
    Register(u8),
    Undefined,
}

pub fn classify(token: &str) -> Token<'_> {
    if let Some(name) = token.strip_suffix(':') {
        return Token::Label(name);
    }
    if let Some(rest) = token.strip_prefix('#') {
        if let Some(v) = parse_number(rest) {
            return Token::ImmediateHash(v);
        }
    }
    if let Some(rest) = token.strip_prefix('=') {
        if let Some(v) = parse_number(rest) {
            return Token::ImmediateEquals(v);
        }
    }
    if let Some((desc, cond)) = lookup(token) {
        return Token::Instruction(desc, cond);
    }
    if let Some(n) = register_number(token) {
        return Token::Register(n);
    }
    Token::Undefined
}

/// Optional sign, then `0x` + hex digits or decimal digits. The magnitude
/// must fit in 32 bits.
pub fn parse_number(s: &str) -> Option<i64> {
    let (negative, digits) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };
    let magnitude = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        u64::from_str_radix(hex, 16).ok()?
    } else {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse::<u64>().ok()?
    };
    if magnitude > u32::MAX as u64 {
        return None;
    }
    let v = magnitude as i64;
    Some(if negative { -v } else { v })
}

pub fn register_number(token: &str) -> Option<u8> {
    match token {
        "sp" => return Some(13),
        "lr" => return Some(14),
        "pc" => return Some(15),
        _ => {}
    }
    let digits = token.strip_prefix('r')?;
    if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: u8 = digits.parse().ok()?;
    (n <= 16).then_some(n)
}
