//! Packet tree decoding.
//!
//! Every packet starts with a 3-bit version and a 3-bit type. Type 4 carries a
//! literal split into 5-bit groups, the high bit of each group saying whether
//! another one follows. Any other type is an operator whose operands are
//! bounded either by a 15-bit total length or by an 11-bit packet count.

use bitvec::prelude::*;
use itertools::Itertools;
use num_bigint::BigUint;

use crate::bits::BitCursor;
use crate::error::DecodeError;

pub const LITERAL: u8 = 4;

const GROUP_CONTINUES: u64 = 1 << 4;
const GROUP_NIBBLE: u64 = 0xf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub version: u8,
    pub type_id: u8,
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// No fixed width; as many nibbles as the transmission carries.
    Literal(BigUint),
    /// Operands in encoding order.
    Operator(Vec<Packet>),
}

/// Turns hex text into bytes, high nibble first. Line breaks are ignored so
/// a transmission may span several lines.
pub fn decode_hex(text: &str) -> Result<Vec<u8>, DecodeError> {
    let digits = text.lines().flat_map(|line| line.trim().chars()).map(|c|
        c.to_digit(16).map(|d| d as u8)
         .ok_or_else(|| DecodeError::InvalidHex(format!("{:?} is not a hex digit", c)))
    ).collect::<Result<Vec<_>, _>>()?;
    if digits.len() % 2 != 0 {
        return Err(DecodeError::InvalidHex(format!("odd number of digits ({})", digits.len())));
    }
    Ok(digits.into_iter().tuples().map(|(hi, lo)| hi << 4 | lo).collect())
}

impl Packet {
    /// Parses the single outermost packet of `bytes`. Padding after it is
    /// left unread.
    pub fn decode(bytes: &[u8]) -> Result<Packet, DecodeError> {
        Packet::parse(&mut BitCursor::new(bytes.view_bits::<Msb0>()))
    }

    pub fn parse(bits: &mut BitCursor) -> Result<Packet, DecodeError> {
        let version = bits.read_bits(3)? as u8;
        let type_id = bits.read_bits(3)? as u8;
        let body = if type_id == LITERAL {
            Body::Literal(read_literal(bits)?)
        } else {
            Body::Operator(read_operands(bits)?)
        };
        Ok(Packet {version, type_id, body})
    }

    pub fn operands(&self) -> &[Packet] {
        match &self.body {
            Body::Literal(_) => &[],
            Body::Operator(operands) => operands,
        }
    }

    /// Bottom-up reduction: `f` sees each packet together with the results
    /// already computed for its operands.
    pub fn fold<T, F: FnMut(&Packet, Vec<T>) -> T>(&self, f: &mut F) -> T {
        let below = self.operands().iter().map(|p| p.fold(&mut *f)).collect();
        f(self, below)
    }

    pub fn version_sum(&self) -> u64 {
        self.fold(&mut |p: &Packet, below: Vec<u64>| p.version as u64 + below.iter().sum::<u64>())
    }

    pub fn eval(&self) -> Result<BigUint, DecodeError> {
        self.fold(&mut |p: &Packet, below: Vec<Result<BigUint, DecodeError>>| -> Result<BigUint, DecodeError> {
            let operands = below.into_iter().collect::<Result<Vec<_>, _>>()?;
            p.apply(&operands)
        })
    }

    fn apply(&self, operands: &[BigUint]) -> Result<BigUint, DecodeError> {
        if let Body::Literal(value) = &self.body {return Ok(value.clone())};
        let type_id = self.type_id;
        let arity = || DecodeError::OperandCount {type_id, found: operands.len()};
        match (type_id, operands) {
            (0, _) => Ok(operands.iter().sum()),
            (1, _) => Ok(operands.iter().product()),
            (2, _) => operands.iter().min().cloned().ok_or_else(arity),
            (3, _) => operands.iter().max().cloned().ok_or_else(arity),
            (5, [a, b]) => Ok(BigUint::from((a > b) as u8)),
            (6, [a, b]) => Ok(BigUint::from((a < b) as u8)),
            (7, [a, b]) => Ok(BigUint::from((a == b) as u8)),
            _ => Err(arity()),
        }
    }

    /// Pre-order walk over this packet and everything nested in it.
    pub fn iter(&self) -> Iter<'_> {
        Iter {stack: vec![self]}
    }
}

pub struct Iter<'a> {
    stack: Vec<&'a Packet>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Packet;

    fn next(&mut self) -> Option<&'a Packet> {
        let packet = self.stack.pop()?;
        self.stack.extend(packet.operands().iter().rev());
        Some(packet)
    }
}

fn read_literal(bits: &mut BitCursor) -> Result<BigUint, DecodeError> {
    let mut value = BigUint::default();
    loop {
        let group = bits.read_bits(5)?;
        value = (value << 4u8) + (group & GROUP_NIBBLE);
        if group & GROUP_CONTINUES == 0 {return Ok(value)};
    }
}

fn read_operands(bits: &mut BitCursor) -> Result<Vec<Packet>, DecodeError> {
    if bits.read_flag()? {
        let count = bits.read_bits(11)? as usize;
        let mut operands = Vec::with_capacity(count);
        for _ in 0 .. count {operands.push(Packet::parse(bits)?)};
        Ok(operands)
    } else {
        let declared = bits.read_bits(15)? as usize;
        let mut group = bits.read_sub_cursor(declared)?;
        let mut operands = vec![];
        // leftover bits inside the group are not checked; a short tail fails on the next header read
        while group.remaining() > 0 {
            operands.push(Packet::parse(&mut group).map_err(|e| match e {
                e @ DecodeError::OutOfBits {..} => DecodeError::MalformedPacket {declared, source: Box::new(e)},
                e => e,
            })?);
        }
        Ok(operands)
    }
}
