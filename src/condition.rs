use serde::{Deserialize, Serialize};

use crate::cpu::Cpsr;

/// 4-bit condition field held in bits 31..28 of every instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    Eq = 0x0,
    Ne = 0x1,
    Cs = 0x2,
    Cc = 0x3,
    Mi = 0x4,
    Pl = 0x5,
    Vs = 0x6,
    Vc = 0x7,
    Hi = 0x8,
    Ls = 0x9,
    Ge = 0xA,
    Lt = 0xB,
    Gt = 0xC,
    Le = 0xD,
    Al = 0xE,
    Nv = 0xF,
}

const SUFFIXES: &[(&str, Condition)] = &[
    ("eq", Condition::Eq),
    ("ne", Condition::Ne),
    ("cs", Condition::Cs),
    ("cc", Condition::Cc),
    ("mi", Condition::Mi),
    ("pl", Condition::Pl),
    ("vs", Condition::Vs),
    ("vc", Condition::Vc),
    ("hi", Condition::Hi),
    ("ls", Condition::Ls),
    ("ge", Condition::Ge),
    ("lt", Condition::Lt),
    ("gt", Condition::Gt),
    ("le", Condition::Le),
    ("al", Condition::Al),
];

impl Condition {
    pub fn from_bits(bits: u32) -> Self {
        match bits & 0xF {
            0x0 => Self::Eq,
            0x1 => Self::Ne,
            0x2 => Self::Cs,
            0x3 => Self::Cc,
            0x4 => Self::Mi,
            0x5 => Self::Pl,
            0x6 => Self::Vs,
            0x7 => Self::Vc,
            0x8 => Self::Hi,
            0x9 => Self::Ls,
            0xA => Self::Ge,
            0xB => Self::Lt,
            0xC => Self::Gt,
            0xD => Self::Le,
            0xE => Self::Al,
            _ => Self::Nv,
        }
    }

    pub fn bits(self) -> u32 {
        self as u32
    }

    /// Looks up a mnemonic suffix; the empty suffix means always.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        if suffix.is_empty() {
            return Some(Self::Al);
        }
        SUFFIXES
            .iter()
            .find(|(s, _)| *s == suffix)
            .map(|(_, c)| *c)
    }

    /// Suffix used when printing; `al` prints as nothing.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Al => "",
            Self::Nv => "nv",
            c => SUFFIXES
                .iter()
                .find(|(_, s)| *s == c)
                .map(|(s, _)| *s)
                .unwrap_or(""),
        }
    }

    pub fn holds(self, flags: Cpsr) -> bool {
        let n = flags.contains(Cpsr::N);
        let z = flags.contains(Cpsr::Z);
        let c = flags.contains(Cpsr::C);
        let v = flags.contains(Cpsr::V);
        match self {
            Self::Eq => z,
            Self::Ne => !z,
            Self::Cs => c,
            Self::Cc => !c,
            Self::Mi => n,
            Self::Pl => !n,
            Self::Vs => v,
            Self::Vc => !v,
            Self::Hi => c && !z,
            Self::Ls => !c || z,
            Self::Ge => n == v,
            Self::Lt => n != v,
            Self::Gt => !z && n == v,
            Self::Le => z || n != v,
            Self::Al => true,
            Self::Nv => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_comparisons_follow_n_and_v() {
        let lt = Cpsr::N;
        assert!(Condition::Lt.holds(lt));
        assert!(Condition::Le.holds(lt));
        assert!(!Condition::Ge.holds(lt));
        assert!(!Condition::Gt.holds(lt));

        let both = Cpsr::N | Cpsr::V;
        assert!(Condition::Ge.holds(both));
        assert!(Condition::Gt.holds(both));
        assert!(!Condition::Gt.holds(both | Cpsr::Z));
    }

    #[test]
    fn suffix_table_round_trips_field_bits() {
        for bits in 0..0xF {
            let c = Condition::from_bits(bits);
            assert_eq!(c.bits(), bits);
            if c != Condition::Al {
                assert_eq!(Condition::from_suffix(c.suffix()), Some(c));
            }
        }
        assert_eq!(Condition::from_suffix(""), Some(Condition::Al));
        assert_eq!(Condition::from_suffix("xx"), None);
        assert!(!Condition::Nv.holds(Cpsr::all()));
    }
}
