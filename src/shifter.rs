use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftType {
    Lsl = 0,
    Lsr = 1,
    Asr = 2,
    Ror = 3,
}

impl ShiftType {
    pub fn from_bits(bits: u32) -> Self {
        match bits & 0x3 {
            0 => Self::Lsl,
            1 => Self::Lsr,
            2 => Self::Asr,
            _ => Self::Ror,
        }
    }

    pub fn bits(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Lsl => "lsl",
            Self::Lsr => "lsr",
            Self::Asr => "asr",
            Self::Ror => "ror",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "lsl" => Some(Self::Lsl),
            "lsr" => Some(Self::Lsr),
            "asr" => Some(Self::Asr),
            "ror" => Some(Self::Ror),
            _ => None,
        }
    }
}

/// Barrel shifter output. `carry` is `None` when no bit was shifted out,
/// in which case the C flag must be left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shifted {
    pub value: u32,
    pub carry: Option<bool>,
}

#[inline]
fn bit(v: u32, n: u32) -> bool {
    (v >> n) & 1 == 1
}

/// Applies `kind` by `amount` bits. Amounts of 32 and above follow the
/// register-specified rules (everything shifted out).
pub fn shift(kind: ShiftType, value: u32, amount: u32) -> Shifted {
    if amount == 0 {
        return Shifted { value, carry: None };
    }
    let (value, carry) = match kind {
        ShiftType::Lsl => match amount {
            1..=31 => (value << amount, bit(value, 32 - amount)),
            32 => (0, bit(value, 0)),
            _ => (0, false),
        },
        ShiftType::Lsr => match amount {
            1..=31 => (value >> amount, bit(value, amount - 1)),
            32 => (0, bit(value, 31)),
            _ => (0, false),
        },
        ShiftType::Asr => {
            if amount < 32 {
                (((value as i32) >> amount) as u32, bit(value, amount - 1))
            } else {
                (((value as i32) >> 31) as u32, bit(value, 31))
            }
        }
        ShiftType::Ror => {
            let r = amount % 32;
            if r == 0 {
                (value, bit(value, 31))
            } else {
                (value.rotate_right(r), bit(value, r - 1))
            }
        }
    };
    Shifted {
        value,
        carry: Some(carry),
    }
}

/// Expands a rotated 8-bit immediate: `imm8` rotated right by `2 * rotate`.
pub fn expand_imm(imm8: u8, rotate: u8) -> Shifted {
    let r = 2 * (rotate as u32 & 0xF);
    let value = (imm8 as u32).rotate_right(r);
    let carry = (r != 0).then(|| bit(value, 31));
    Shifted { value, carry }
}

/// Finds the `(rotate, imm8)` pair representing `value`, trying every even
/// rotation from 0 to 30. `None` if the value has no such form.
pub fn encode_imm(value: u32) -> Option<(u8, u8)> {
    (0..16u32).find_map(|step| {
        let v = value.rotate_left(2 * step);
        (v <= 0xFF).then_some((step as u8, v as u8))
    })
}
