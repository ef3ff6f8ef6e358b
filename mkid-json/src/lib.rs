//! mkid-json contains the JSON schemas used by mkid-comb and its clients.

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};

/// API JSON schema.
///
/// This JSON schema corresponds to GET requests on `/api`. It contains a
/// summary of the instrument and of the current planning session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Api {
    /// Instrument parameters.
    pub instrument: Instrument,
    /// Local oscillator settings.
    pub lo: Lo,
    /// Planning session status.
    pub plan: PlanStatus,
    /// Software versions.
    pub versions: Versions,
}

/// Instrument JSON schema.
///
/// Read-only summary of the instrument configuration that was loaded at
/// startup.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Instrument {
    /// Total number of readout channels.
    pub n_channels: usize,
    /// Number of processing streams.
    pub n_streams: usize,
    /// Number of channels in each stream.
    pub n_channels_per_stream: usize,
    /// DAC sampling frequency in samples per second.
    pub dac_sample_rate: f64,
    /// DAC frequency resolution in Hz.
    pub dac_freq_resolution: f64,
    /// Number of FFT bins of the channelizer.
    pub n_fft_bins: usize,
    /// DDS sampling frequency in samples per second.
    pub dds_sample_rate: f64,
    /// DDS frequency resolution in Hz.
    pub dds_freq_resolution: f64,
}

/// Local oscillator JSON schema.
///
/// This JSON schema corresponds to GET and PUT requests on `/api/lo`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Lo {
    /// LO frequency in Hz.
    ///
    /// This is `None` until the LO frequency has been set.
    pub frequency: Option<f64>,
}

/// Planning session status.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct PlanStatus {
    /// Number of resonators in the current frequency list.
    pub num_resonators: usize,
    /// The resonators have been assigned to channels.
    pub channels_planned: bool,
    /// The FFT bin selection has been calculated.
    pub bins_planned: bool,
    /// The DAC comb has been built.
    pub comb_built: bool,
    /// The DDS tones have been built.
    pub dds_built: bool,
    /// Time of the last planning operation (RFC 3339).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
}

/// Software versions JSON schema.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Versions {
    /// mkid-comb git version.
    pub mkid_comb_git: String,
    /// mkid-comb crate version.
    pub mkid_comb_version: String,
}

/// Order in which resonators are placed into the channel grid.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PackingOrder {
    /// Consecutive frequencies fill a stream before moving to the next stream.
    ///
    /// Padding is spread across streams.
    #[default]
    ColumnMajor,
    /// Consecutive frequencies share a channel number across streams.
    ///
    /// Padding is placed at the end.
    RowMajor,
}

macro_rules! impl_str_conv {
    ($ty:ty, $($s:expr => $v:ident),*) => {
        impl std::str::FromStr for $ty {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, ()> {
                Ok(match s {
                    $(
                        $s => <$ty>::$v,
                    )*
                        _ => return Err(()),
                })
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
                write!(f, "{}", match self {
                    $(
                        <$ty>::$v => $s,
                    )*
                })
            }
        }
    }
}

impl_str_conv!(PackingOrder,
               "F" => ColumnMajor,
               "C" => RowMajor);

/// Non-fatal planning advisory.
///
/// Advisories do not stop the planning pipeline, but they are reported to the
/// caller together with the result.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// More values were given than the channel grid can hold. The list was
    /// truncated.
    Truncated {
        /// What was truncated.
        what: String,
        /// Number of values requested.
        requested: usize,
        /// Number of values kept.
        capacity: usize,
    },
    /// The comb peak is higher than expected for random phases. The tone
    /// phases have probably added up constructively.
    PhaseSum {
        /// Peak sample magnitude.
        peak: i64,
        /// Expected peak for Gaussian distributed samples.
        expected_peak: f64,
    },
    /// The comb does not use the full dynamic range of the DAC.
    UnderutilizedRange {
        /// Peak sample magnitude.
        peak: i64,
        /// Maximum sample magnitude.
        max_amplitude: i64,
        /// Attenuation in dB that could be moved into the DAC LUT by
        /// increasing the global attenuation.
        headroom_db: i32,
    },
}

impl std::fmt::Display for Advisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Advisory::Truncated {
                what,
                requested,
                capacity,
            } => write!(
                f,
                "too many {what} provided ({requested}); only {capacity} can be accommodated"
            ),
            Advisory::PhaseSum {
                peak,
                expected_peak,
            } => write!(
                f,
                "comb peak {peak} is above the expected {expected_peak:.1}; \
                 the relative phases may have added up sub-optimally"
            ),
            Advisory::UnderutilizedRange {
                peak,
                max_amplitude,
                headroom_db,
            } => write!(
                f,
                "DAC dynamic range not fully utilized (peak {peak} of {max_amplitude}); \
                 increase global attenuation by {headroom_db} dB"
            ),
        }
    }
}

/// Channel grid PUT JSON schema.
///
/// This JSON schema corresponds to PUT requests on `/api/channels`. It gives
/// the resonator frequencies to assign to channels.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct PutChannels {
    /// Resonator frequencies in Hz.
    pub frequencies: Vec<f64>,
    /// Packing order.
    #[serde(default)]
    pub order: PackingOrder,
}

/// Channel grid JSON schema.
///
/// This JSON schema corresponds to GET and PUT requests on
/// `/api/channels`. Each inner vector is a channel (row) and each element is a
/// stream (column). Empty channels are `null`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Channels {
    /// Packing order used for the grid.
    pub order: PackingOrder,
    /// Resonator frequency of each channel in Hz.
    pub frequencies: Vec<Vec<Option<f64>>>,
    /// FFT bin index of each channel.
    ///
    /// This is `None` if the bins have not been calculated, which happens when
    /// the LO frequency has not been set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fft_bins: Option<Vec<Vec<Option<u32>>>>,
    /// Advisories produced while planning.
    pub advisories: Vec<Advisory>,
}

/// DAC comb PUT JSON schema.
///
/// This JSON schema corresponds to PUT requests on `/api/comb`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct PutComb {
    /// Resonator frequencies in Hz.
    ///
    /// If omitted, the frequencies of the current channel plan are used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequencies: Option<Vec<f64>>,
    /// Absolute attenuation in dB for each resonator.
    ///
    /// If omitted, the previous attenuations are used, or 20 dB for each
    /// resonator if there are none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attenuations: Option<Vec<f64>>,
    /// Global DAC attenuation in dB.
    #[serde(default)]
    pub global_attenuation: f64,
    /// Phase of each tone in radians.
    ///
    /// If omitted, random phases are used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phases: Option<Vec<f64>>,
}

/// DAC comb JSON schema.
///
/// This JSON schema corresponds to GET and PUT requests on `/api/comb`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Comb {
    /// Tone frequencies after quantization, relative to the LO, in Hz.
    pub quantized_frequencies: Vec<f64>,
    /// Phase of each tone in radians.
    pub phases: Vec<f64>,
    /// Peak sample magnitude.
    pub peak: i64,
    /// Maximum sample magnitude.
    pub max_amplitude: i64,
    /// Percentage of the DAC dynamic range used.
    pub dynamic_range_percent: f64,
    /// Number of samples in the comb.
    pub num_samples: usize,
    /// Advisories produced while building the comb.
    pub advisories: Vec<Advisory>,
}

/// DDS tones PUT JSON schema.
///
/// This JSON schema corresponds to PUT requests on `/api/dds`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct PutDds {
    /// Phase of each channel in radians, with the same shape as the channel
    /// grid.
    ///
    /// If omitted, all phases are zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phases: Option<Vec<Vec<Option<f64>>>>,
}

/// DDS tones JSON schema.
///
/// This JSON schema corresponds to GET and PUT requests on `/api/dds`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Dds {
    /// Residual frequency of each channel after quantization, in Hz.
    pub quantized_frequencies: Vec<Vec<Option<f64>>>,
    /// Phase of each channel in radians.
    pub phases: Vec<Vec<Option<f64>>>,
    /// Number of interleaved samples in each stream.
    pub samples_per_stream: usize,
}

/// Attenuator PUT JSON schema.
///
/// This JSON schema corresponds to PUT requests on `/api/attenuator`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PutAttenuator {
    /// Attenuator ID.
    ///
    /// 1 and 2 are the RF upconverter path, 3 is the RF downconverter path.
    pub id: u8,
    /// Attenuation in dB, between 0 and 31.75 dB in steps of 0.25 dB.
    pub attenuation: f64,
}

/// Load JSON schema.
///
/// This JSON schema corresponds to POST requests on `/api/load`. It summarizes
/// what has been written to the instrument.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Load {
    /// Number of channel selection rows loaded.
    pub chan_select_rows: usize,
    /// Number of 64-bit words written to the DDS memories.
    pub dds_words: usize,
    /// Number of bytes of DAC LUT sent.
    pub dac_lut_bytes: usize,
    /// The LO frequency was sent.
    pub lo_loaded: bool,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn packing_order_str() {
        assert_eq!("F".parse::<PackingOrder>(), Ok(PackingOrder::ColumnMajor));
        assert_eq!("C".parse::<PackingOrder>(), Ok(PackingOrder::RowMajor));
        assert!("A".parse::<PackingOrder>().is_err());
        assert_eq!(PackingOrder::RowMajor.to_string(), "C");
    }

    #[test]
    fn advisory_display() {
        let advisory = Advisory::UnderutilizedRange {
            peak: 1000,
            max_amplitude: 32767,
            headroom_db: 30,
        };
        assert_eq!(
            advisory.to_string(),
            "DAC dynamic range not fully utilized (peak 1000 of 32767); \
             increase global attenuation by 30 dB"
        );
    }
}
