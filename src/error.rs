/// The error returned when constructing invalid [`ChannelWeights`](crate::ChannelWeights).
#[derive(Debug, Clone, Copy, PartialEq)]
#[non_exhaustive]
pub enum ChannelWeightsError {
    /// The weight of the given channel (0 = R, 1 = G, 2 = B) is negative.
    Negative { channel: usize, value: f32 },
    /// The weight of the given channel is NaN or infinite.
    NotFinite { channel: usize },
}
impl std::fmt::Display for ChannelWeightsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelWeightsError::Negative { channel, value } => {
                write!(
                    f,
                    "Channel weight {} of {} is negative, weights must be >= 0",
                    value,
                    channel_name(*channel)
                )
            }
            ChannelWeightsError::NotFinite { channel } => {
                write!(
                    f,
                    "Channel weight of {} is not a finite number",
                    channel_name(*channel)
                )
            }
        }
    }
}
impl std::error::Error for ChannelWeightsError {}

fn channel_name(channel: usize) -> &'static str {
    match channel {
        0 => "R",
        1 => "G",
        2 => "B",
        _ => "an unknown channel",
    }
}
