//! Human-readable rendering of brokers.
//!
//! The canonical (stored, wire) form keeps full float precision. Rendering is
//! for display only: every float is written with exactly two decimals,
//! rounded half-up.

use std::fmt;
use std::io;

use log::error;
use rust_decimal::prelude::*;
use serde::Serialize;
use serde_json::ser::Formatter;

use super::brokers_model::{Broker, Stock};
use crate::constants::DISPLAY_DECIMAL_PRECISION;

/// Formats a currency amount with two decimals, rounding half away from zero.
///
/// Rounding applies to the exact binary value of the float, so `2.675`
/// (stored as 2.67499999...) renders `2.67`. Non-representable values
/// (beyond `Decimal` range) fall back to the float formatter.
pub fn format_currency(value: f64) -> String {
    match Decimal::from_f64_retain(value) {
        Some(amount) => {
            let mut rounded = amount.round_dp_with_strategy(
                DISPLAY_DECIMAL_PRECISION,
                RoundingStrategy::MidpointAwayFromZero,
            );
            rounded.rescale(DISPLAY_DECIMAL_PRECISION);
            if rounded.is_zero() {
                rounded.set_sign_positive(true);
            }
            rounded.to_string()
        }
        None => format!("{:.*}", DISPLAY_DECIMAL_PRECISION as usize, value),
    }
}

/// JSON formatter for display text: `", "` and `": "` separators, floats as
/// two-decimal currency.
#[derive(Debug, Default, Clone, Copy)]
struct DisplayFormatter;

impl Formatter for DisplayFormatter {
    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(format_currency(value).as_bytes())
    }

    fn write_f32<W>(&mut self, writer: &mut W, value: f32) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.write_f64(writer, f64::from(value))
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }
}

fn render_display<T: Serialize>(value: &T, label: &str) -> String {
    let mut out = Vec::with_capacity(256);
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, DisplayFormatter);
    // Every map rendered here is keyed by String, so this can't fail in practice.
    if let Err(e) = value.serialize(&mut serializer) {
        error!("Failed to render {}: {}", label, e);
    }
    String::from_utf8_lossy(&out).into_owned()
}

impl Broker {
    /// Display rendering, e.g.
    /// `{"owner": "alice", "total": 1000.00, ..., "stocks": {}}`.
    ///
    /// Idempotent; also used for equality.
    pub fn render(&self) -> String {
        render_display(self, &self.owner)
    }
}

impl Stock {
    pub fn render(&self) -> String {
        render_display(self, &self.symbol)
    }
}

impl fmt::Display for Broker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl fmt::Display for Stock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl PartialEq for Broker {
    fn eq(&self, other: &Self) -> bool {
        self.render() == other.render()
    }
}

impl PartialEq for Stock {
    fn eq(&self, other: &Self) -> bool {
        self.render() == other.render()
    }
}
