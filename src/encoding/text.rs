//! Prometheus text exposition format.
//!
//! ```
//! # use maxctrl_exporter::encoding::text::encode;
//! # use maxctrl_exporter::registry::{Registry, Subject};
//! let registry = Registry::default();
//! let servers = registry.catalog(Subject::Server);
//! let samples = vec![
//!     servers.sample("server_connections", 5, &["s1", "10.0.0.1"]).unwrap(),
//! ];
//!
//! let mut buffer = String::new();
//! encode(&mut buffer, &samples).unwrap();
//!
//! let expected = "# HELP maxctrl_server_connections Amount of connections to the server\n".to_owned()
//!     + "# TYPE maxctrl_server_connections gauge\n"
//!     + "maxctrl_server_connections{server=\"s1\",address=\"10.0.0.1\"} 5\n";
//! assert_eq!(expected, buffer);
//! ```

use std::collections::BTreeMap;
use std::fmt::Write;

use super::{EncodeValue, HelpEncoder, LabelValueEncoder};
use crate::registry::{Descriptor, Sample};

/// Content type of the encoded snapshot.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Encode the given samples in the Prometheus text exposition format.
///
/// Samples are grouped into one family per metric name. Families are written
/// in name order and samples within a family in label value order, so the
/// output of equal inputs is byte identical.
pub fn encode<W>(writer: &mut W, samples: &[Sample]) -> Result<(), std::fmt::Error>
where
    W: Write,
{
    let mut families: BTreeMap<&str, (&Descriptor, Vec<&Sample>)> = BTreeMap::new();
    for sample in samples {
        let descriptor: &Descriptor = sample.descriptor();
        families
            .entry(descriptor.name())
            .or_insert_with(|| (descriptor, Vec::new()))
            .1
            .push(sample);
    }

    for (descriptor, mut samples) in families.into_values() {
        samples.sort_by(|a, b| a.labels().cmp(b.labels()));

        let mut descriptor_encoder = DescriptorEncoder::new(&mut *writer);
        let mut metric_encoder = descriptor_encoder.encode_descriptor(descriptor)?;
        for sample in samples {
            metric_encoder.encode_sample(sample)?;
        }
    }

    Ok(())
}

/// Encoder for a metric descriptor, i.e. the `# HELP` and `# TYPE` lines.
pub struct DescriptorEncoder<'a> {
    writer: &'a mut dyn Write,
}

impl std::fmt::Debug for DescriptorEncoder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorEncoder").finish()
    }
}

impl<'a> DescriptorEncoder<'a> {
    pub(crate) fn new(writer: &'a mut dyn Write) -> DescriptorEncoder<'a> {
        Self { writer }
    }

    /// Writes the preamble of a metric family.
    pub fn encode_descriptor<'s>(
        &'s mut self,
        descriptor: &'s Descriptor,
    ) -> Result<MetricEncoder<'s>, std::fmt::Error> {
        self.writer.write_str("# HELP ")?;
        self.writer.write_str(descriptor.name())?;
        self.writer.write_str(" ")?;
        HelpEncoder::new(self.writer).write_str(descriptor.help())?;
        self.writer.write_str("\n")?;

        self.writer.write_str("# TYPE ")?;
        self.writer.write_str(descriptor.name())?;
        self.writer.write_str(" ")?;
        self.writer.write_str(descriptor.metric_type().as_str())?;
        self.writer.write_str("\n")?;

        Ok(MetricEncoder {
            writer: &mut *self.writer,
            descriptor,
        })
    }
}

/// Encoder for the sample lines of one metric family.
pub struct MetricEncoder<'a> {
    writer: &'a mut dyn Write,
    descriptor: &'a Descriptor,
}

impl std::fmt::Debug for MetricEncoder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricEncoder")
            .field("descriptor", &self.descriptor)
            .finish()
    }
}

impl MetricEncoder<'_> {
    /// Writes one sample line.
    pub fn encode_sample(&mut self, sample: &Sample) -> Result<(), std::fmt::Error> {
        self.writer.write_str(self.descriptor.name())?;
        self.encode_labels(sample.labels())?;

        self.writer.write_str(" ")?;
        sample.value().encode(self.writer)?;

        if let Some(timestamp) = sample.timestamp() {
            self.writer.write_str(" ")?;
            timestamp.encode(self.writer)?;
        }

        self.writer.write_str("\n")
    }

    fn encode_labels(&mut self, values: &[String]) -> Result<(), std::fmt::Error> {
        if values.is_empty() {
            return Ok(());
        }

        let descriptor = self.descriptor;
        self.writer.write_str("{")?;
        for (i, (name, value)) in descriptor.labels().iter().zip(values).enumerate() {
            if i > 0 {
                self.writer.write_str(",")?;
            }
            self.writer.write_str(name)?;
            self.writer.write_str("=\"")?;
            LabelValueEncoder::new(self.writer).write_str(value)?;
            self.writer.write_str("\"")?;
        }
        self.writer.write_str("}")
    }
}
