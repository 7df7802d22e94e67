//! Exposition format implementations.

use std::fmt::Write;

pub mod text;

/// An encodable sample value.
pub trait EncodeValue {
    /// Encode the given instance in the Prometheus text encoding.
    fn encode(&self, writer: &mut dyn Write) -> Result<(), std::fmt::Error>;
}

impl EncodeValue for f64 {
    fn encode(&self, writer: &mut dyn Write) -> Result<(), std::fmt::Error> {
        if self.is_nan() {
            return writer.write_str("NaN");
        }
        if self.is_infinite() {
            return writer.write_str(if self.is_sign_positive() { "+Inf" } else { "-Inf" });
        }

        // Whole numbers are written without a fractional part.
        if self.fract() == 0.0 && self.abs() < 1e15 {
            return (*self as i64).encode(writer);
        }

        writer.write_str(dtoa::Buffer::new().format(*self))
    }
}

impl EncodeValue for i64 {
    fn encode(&self, writer: &mut dyn Write) -> Result<(), std::fmt::Error> {
        writer.write_str(itoa::Buffer::new().format(*self))
    }
}

/// Encoder for a label value.
///
/// Escapes backslashes, double quotes and line feeds on the fly.
pub struct LabelValueEncoder<'a> {
    writer: &'a mut dyn Write,
}

impl std::fmt::Debug for LabelValueEncoder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelValueEncoder").finish()
    }
}

impl<'a> LabelValueEncoder<'a> {
    pub(crate) fn new(writer: &'a mut dyn Write) -> Self {
        Self { writer }
    }
}

impl Write for LabelValueEncoder<'_> {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        for c in s.chars() {
            match c {
                '\\' => self.writer.write_str(r"\\")?,
                '"' => self.writer.write_str(r#"\""#)?,
                '\n' => self.writer.write_str(r"\n")?,
                c => self.writer.write_char(c)?,
            }
        }
        Ok(())
    }
}

/// Encoder for a help text.
///
/// Escapes backslashes and line feeds on the fly.
pub struct HelpEncoder<'a> {
    writer: &'a mut dyn Write,
}

impl std::fmt::Debug for HelpEncoder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HelpEncoder").finish()
    }
}

impl<'a> HelpEncoder<'a> {
    pub(crate) fn new(writer: &'a mut dyn Write) -> Self {
        Self { writer }
    }
}

impl Write for HelpEncoder<'_> {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        for c in s.chars() {
            match c {
                '\\' => self.writer.write_str(r"\\")?,
                '\n' => self.writer.write_str(r"\n")?,
                c => self.writer.write_char(c)?,
            }
        }
        Ok(())
    }
}
