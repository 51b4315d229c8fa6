//! Keypad input events.

/// A single decimal digit `0`-`9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digit(u8);

impl Digit {
    /// Returns `None` for values above 9.
    pub fn new(value: u8) -> Option<Self> {
        (value <= 9).then_some(Self(value))
    }

    pub fn from_char(c: char) -> Option<Self> {
        c.to_digit(10).map(|d| Self(d as u8))
    }

    pub fn as_char(self) -> char {
        char::from(b'0' + self.0)
    }
}

/// Binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    /// Accepts the ASCII operators plus the keypad glyphs `×` and `÷`.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Add),
            '-' => Some(Self::Subtract),
            '*' | '×' => Some(Self::Multiply),
            '/' | '÷' => Some(Self::Divide),
            _ => None,
        }
    }

    /// Character written into the equation buffer.
    pub fn as_char(self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => '*',
            Self::Divide => '/',
        }
    }

    /// True if `c` is one of the characters the equation buffer uses for operators.
    pub fn is_operator_char(c: char) -> bool {
        matches!(c, '+' | '-' | '*' | '/')
    }
}

/// One keypad press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Digit(Digit),
    Operator(Operator),
    Decimal,
    Clear,
    Equals,
}

impl Key {
    pub fn from_char(c: char) -> Option<Self> {
        if let Some(d) = Digit::from_char(c) {
            return Some(Self::Digit(d));
        }
        if let Some(op) = Operator::from_char(c) {
            return Some(Self::Operator(op));
        }
        match c {
            '.' => Some(Self::Decimal),
            '=' => Some(Self::Equals),
            'c' | 'C' => Some(Self::Clear),
            _ => None,
        }
    }
}
