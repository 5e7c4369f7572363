/// Identifier the external tracker assigns to one tracked object.
pub type TrackId = u64;

/// Zero-based index of a video frame.
pub type FrameIndex = u64;
