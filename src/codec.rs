// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Bidirectional primitive codec
//!
//! A [`Codec`] wraps either an output byte sink or an input byte cursor,
//! chosen at construction, and exposes a single entry point per primitive
//! type. Each entry point takes `&mut` to the value: in write mode the value
//! is serialized, in read mode it is overwritten. Client code can therefore
//! write one "visit all fields in order" routine serving both directions
//! (see [`crate::FontAsset::transcode`]).
//!
//! Two wire [`Order`] variants share the same call contract:
//!
//! - [`Order::Host`]: primitives in the host's native byte order, characters
//!   through the native string codec (UTF-8).
//! - [`Order::Network`]: 16-/32-bit integers big-endian regardless of host
//!   order; floats move through the same 32-bit big-endian path as their bit
//!   pattern; characters are single 16-bit code units in network order
//!   (basic-plane code points only).
//!
//! Malformed input — a truncated stream, a length prefix exceeding the
//! remaining bytes, an invalid character encoding — fails with a distinct
//! [`std::io::Error`]; there is no partial recovery.

use crate::conv::to_i32;
use std::io::{self, Read, Write};

/// Wire byte order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    /// The running machine's native byte order, native string codec
    Host,
    /// Big-endian, 16-bit character code units
    Network,
}

enum Mode<'a> {
    Write(&'a mut dyn Write),
    Read(&'a mut dyn Read),
}

/// A primitive-level encoder/decoder over a byte stream
pub struct Codec<'a> {
    mode: Mode<'a>,
    order: Order,
}

fn bad_data(msg: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

fn read_utf8_char(src: &mut dyn Read) -> io::Result<char> {
    let mut buf = [0u8; 4];
    src.read_exact(&mut buf[..1])?;
    let len = match buf[0] {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => return Err(bad_data("invalid UTF-8 leading byte")),
    };
    if len > 1 {
        src.read_exact(&mut buf[1..len])?;
    }
    std::str::from_utf8(&buf[..len])
        .ok()
        .and_then(|s| s.chars().next())
        .ok_or_else(|| bad_data("invalid UTF-8 sequence"))
}

impl<'a> Codec<'a> {
    /// Construct in write mode over an output sink
    pub fn writer(sink: &'a mut dyn Write, order: Order) -> Self {
        Codec {
            mode: Mode::Write(sink),
            order,
        }
    }

    /// Construct in read mode over an input cursor
    pub fn reader(source: &'a mut dyn Read, order: Order) -> Self {
        Codec {
            mode: Mode::Read(source),
            order,
        }
    }

    /// Whether this codec was constructed in read mode
    #[inline]
    pub fn is_reading(&self) -> bool {
        matches!(self.mode, Mode::Read(_))
    }

    /// The wire order this codec was constructed with
    #[inline]
    pub fn order(&self) -> Order {
        self.order
    }

    fn word16(&mut self, v: &mut u16) -> io::Result<()> {
        let order = self.order;
        match &mut self.mode {
            Mode::Write(sink) => {
                let bytes = match order {
                    Order::Host => v.to_ne_bytes(),
                    Order::Network => v.to_be_bytes(),
                };
                sink.write_all(&bytes)
            }
            Mode::Read(src) => {
                let mut bytes = [0u8; 2];
                src.read_exact(&mut bytes)?;
                *v = match order {
                    Order::Host => u16::from_ne_bytes(bytes),
                    Order::Network => u16::from_be_bytes(bytes),
                };
                Ok(())
            }
        }
    }

    fn word32(&mut self, v: &mut u32) -> io::Result<()> {
        let order = self.order;
        match &mut self.mode {
            Mode::Write(sink) => {
                let bytes = match order {
                    Order::Host => v.to_ne_bytes(),
                    Order::Network => v.to_be_bytes(),
                };
                sink.write_all(&bytes)
            }
            Mode::Read(src) => {
                let mut bytes = [0u8; 4];
                src.read_exact(&mut bytes)?;
                *v = match order {
                    Order::Host => u32::from_ne_bytes(bytes),
                    Order::Network => u32::from_be_bytes(bytes),
                };
                Ok(())
            }
        }
    }

    /// 32-bit unsigned integer
    pub fn u32(&mut self, v: &mut u32) -> io::Result<()> {
        self.word32(v)
    }

    /// 32-bit signed integer
    pub fn i32(&mut self, v: &mut i32) -> io::Result<()> {
        let mut bits = *v as u32;
        self.word32(&mut bits)?;
        *v = bits as i32;
        Ok(())
    }

    /// 16-bit signed integer
    pub fn i16(&mut self, v: &mut i16) -> io::Result<()> {
        let mut bits = *v as u16;
        self.word16(&mut bits)?;
        *v = bits as i16;
        Ok(())
    }

    /// 32-bit float, moved as its bit pattern through the 32-bit integer path
    pub fn f32(&mut self, v: &mut f32) -> io::Result<()> {
        let mut bits = v.to_bits();
        self.word32(&mut bits)?;
        *v = f32::from_bits(bits);
        Ok(())
    }

    /// Boolean, one byte on the wire
    pub fn bool(&mut self, v: &mut bool) -> io::Result<()> {
        match &mut self.mode {
            Mode::Write(sink) => sink.write_all(&[u8::from(*v)]),
            Mode::Read(src) => {
                let mut byte = [0u8; 1];
                src.read_exact(&mut byte)?;
                *v = byte[0] != 0;
                Ok(())
            }
        }
    }

    /// Single character
    ///
    /// In the network variant, code points outside the basic plane cannot be
    /// represented as one 16-bit code unit and fail with `InvalidData`.
    pub fn chr(&mut self, v: &mut char) -> io::Result<()> {
        match self.order {
            Order::Host => match &mut self.mode {
                Mode::Write(sink) => {
                    let mut buf = [0u8; 4];
                    sink.write_all(v.encode_utf8(&mut buf).as_bytes())
                }
                Mode::Read(src) => {
                    *v = read_utf8_char(&mut **src)?;
                    Ok(())
                }
            },
            Order::Network => {
                let mut unit = match &self.mode {
                    Mode::Read(_) => 0,
                    Mode::Write(_) => {
                        u16::try_from(*v as u32)
                            .map_err(|_| bad_data("character outside the basic plane"))?
                    }
                };
                self.word16(&mut unit)?;
                if self.is_reading() {
                    *v = char::from_u32(u32::from(unit))
                        .ok_or_else(|| bad_data("invalid 16-bit code unit"))?;
                }
                Ok(())
            }
        }
    }

    /// Fixed-length character array
    pub fn chars(&mut self, buf: &mut [char]) -> io::Result<()> {
        for c in buf {
            self.chr(c)?;
        }
        Ok(())
    }

    /// Length-prefixed string
    ///
    /// The character count is emitted as a 32-bit integer, immediately
    /// followed by that many characters.
    pub fn string(&mut self, s: &mut String) -> io::Result<()> {
        let mut count = to_i32(s.chars().count());
        self.i32(&mut count)?;
        if self.is_reading() {
            if count < 0 {
                return Err(bad_data("negative string length"));
            }
            s.clear();
            for _ in 0..count {
                let mut c = '\0';
                self.chr(&mut c)?;
                s.push(c);
            }
        } else {
            for c in s.chars() {
                let mut c = c;
                self.chr(&mut c)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(order: Order, f: impl Fn(&mut Codec) -> io::Result<()>) -> Vec<u8> {
        let mut buf = Vec::new();
        let mut codec = Codec::writer(&mut buf, order);
        f(&mut codec).unwrap();
        buf
    }

    #[test]
    fn integers_both_orders() {
        for order in [Order::Host, Order::Network] {
            let buf = round_trip(order, |c| {
                c.u32(&mut 0xDEAD_BEEF)?;
                c.i32(&mut -12345)?;
                c.i16(&mut -321)
            });
            assert_eq!(buf.len(), 10);

            let mut src: &[u8] = &buf;
            let mut codec = Codec::reader(&mut src, order);
            let (mut a, mut b, mut d) = (0u32, 0i32, 0i16);
            codec.u32(&mut a).unwrap();
            codec.i32(&mut b).unwrap();
            codec.i16(&mut d).unwrap();
            assert_eq!((a, b, d), (0xDEAD_BEEF, -12345, -321));
        }
    }

    #[test]
    fn network_is_big_endian() {
        let mut buf = Vec::new();
        let mut codec = Codec::writer(&mut buf, Order::Network);
        codec.u32(&mut 0x0102_0304).unwrap();
        codec.i16(&mut 0x0506).unwrap();
        assert_eq!(buf, [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn host_is_native() {
        let mut buf = Vec::new();
        let mut codec = Codec::writer(&mut buf, Order::Host);
        codec.u32(&mut 0x0102_0304).unwrap();
        assert_eq!(buf, 0x0102_0304u32.to_ne_bytes());
    }

    #[test]
    fn floats_via_bit_pattern() {
        for order in [Order::Host, Order::Network] {
            let buf = round_trip(order, |c| c.f32(&mut 3.5));
            let mut src: &[u8] = &buf;
            let mut codec = Codec::reader(&mut src, order);
            let mut v = 0.0f32;
            codec.f32(&mut v).unwrap();
            assert_eq!(v, 3.5);
        }
        // network float bytes equal the big-endian bit pattern
        let buf = round_trip(Order::Network, |c| c.f32(&mut 1.0));
        assert_eq!(buf, 1.0f32.to_bits().to_be_bytes());
    }

    #[test]
    fn bools() {
        let buf = round_trip(Order::Network, |c| {
            c.bool(&mut true)?;
            c.bool(&mut false)
        });
        assert_eq!(buf, [1, 0]);

        let mut src: &[u8] = &buf;
        let mut codec = Codec::reader(&mut src, Order::Network);
        let (mut a, mut b) = (false, true);
        codec.bool(&mut a).unwrap();
        codec.bool(&mut b).unwrap();
        assert!(a);
        assert!(!b);
    }

    #[test]
    fn strings_round_trip() {
        for order in [Order::Host, Order::Network] {
            let buf = round_trip(order, |c| c.string(&mut String::from("Héllo!")));
            let mut src: &[u8] = &buf;
            let mut codec = Codec::reader(&mut src, order);
            let mut s = String::new();
            codec.string(&mut s).unwrap();
            assert_eq!(s, "Héllo!");
        }
    }

    #[test]
    fn network_chars_are_16bit_units() {
        let buf = round_trip(Order::Network, |c| c.chr(&mut 'é'));
        assert_eq!(buf, [0x00, 0xE9]);
    }

    #[test]
    fn network_rejects_non_bmp() {
        let mut buf = Vec::new();
        let mut codec = Codec::writer(&mut buf, Order::Network);
        let err = codec.chr(&mut '😀').unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        // host order handles it via UTF-8
        let buf = round_trip(Order::Host, |c| c.chr(&mut '😀'));
        let mut src: &[u8] = &buf;
        let mut codec = Codec::reader(&mut src, Order::Host);
        let mut c = '\0';
        codec.chr(&mut c).unwrap();
        assert_eq!(c, '😀');
    }

    #[test]
    fn fixed_char_array() {
        let mut chars = ['A', 'b', '?'];
        let mut buf = Vec::new();
        let mut codec = Codec::writer(&mut buf, Order::Network);
        codec.chars(&mut chars).unwrap();
        assert_eq!(buf.len(), 6);

        let mut src: &[u8] = &buf;
        let mut codec = Codec::reader(&mut src, Order::Network);
        let mut out = ['\0'; 3];
        codec.chars(&mut out).unwrap();
        assert_eq!(out, chars);
    }

    #[test]
    fn truncated_stream_fails() {
        let buf = [0u8, 1];
        let mut src: &[u8] = &buf;
        let mut codec = Codec::reader(&mut src, Order::Network);
        let mut v = 0u32;
        let err = codec.u32(&mut v).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn oversized_length_prefix_fails() {
        // claims 1000 characters, supplies none
        let buf = 1000i32.to_be_bytes();
        let mut src: &[u8] = &buf;
        let mut codec = Codec::reader(&mut src, Order::Network);
        let mut s = String::new();
        let err = codec.string(&mut s).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn negative_length_prefix_fails() {
        let buf = (-1i32).to_be_bytes();
        let mut src: &[u8] = &buf;
        let mut codec = Codec::reader(&mut src, Order::Network);
        let mut s = String::new();
        let err = codec.string(&mut s).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
