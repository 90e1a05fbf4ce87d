//! Local and remote media flags.
//!
//! Boolean view of track lifecycle events: which of our devices are
//! enabled, whether we are muted, and whether the remote side is sending
//! video. Track events for local devices update the enabled flags; remote
//! video events drive `has_video` for the remote video surface.

use serde::Serialize;

/// Media track kind reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    /// Audio track.
    Audio,
    /// Video track.
    Video,
}

/// Media flags owned by the session reducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VideoState {
    /// Local camera enabled.
    pub is_video_enabled: bool,
    /// Local microphone enabled.
    pub is_audio_enabled: bool,
    /// Local screen share active.
    pub is_screen_sharing: bool,
    /// Local microphone muted (enabled but silent).
    pub is_muted: bool,
    /// Remote side currently sending video.
    pub has_video: bool,
}

impl Default for VideoState {
    /// Devices start enabled and unmuted; no remote video yet.
    fn default() -> Self {
        Self {
            is_video_enabled: true,
            is_audio_enabled: true,
            is_screen_sharing: false,
            is_muted: false,
            has_video: false,
        }
    }
}

impl VideoState {
    /// Create the pre-session baseline.
    pub fn new() -> Self {
        Self::default()
    }

    /// A track started.
    ///
    /// Local tracks flip their device flag on; a local audio track also
    /// resolves the mute flag from its enabled state. Remote video marks
    /// the remote surface live.
    pub fn track_started(&mut self, kind: TrackKind, local: bool, enabled: bool) {
        match (kind, local) {
            (TrackKind::Video, true) => self.is_video_enabled = true,
            (TrackKind::Audio, true) => {
                self.is_audio_enabled = true;
                self.is_muted = !enabled;
            },
            (TrackKind::Video, false) => self.has_video = true,
            (TrackKind::Audio, false) => {},
        }
    }

    /// A track stopped. Inverse of [`VideoState::track_started`] per flag.
    pub fn track_stopped(&mut self, kind: TrackKind, local: bool) {
        match (kind, local) {
            (TrackKind::Video, true) => self.is_video_enabled = false,
            (TrackKind::Audio, true) => self.is_audio_enabled = false,
            (TrackKind::Video, false) => self.has_video = false,
            (TrackKind::Audio, false) => {},
        }
    }

    /// Reset to the pre-session baseline (session teardown).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_start_enabled_and_unmuted() {
        let video = VideoState::new();
        assert!(video.is_video_enabled);
        assert!(video.is_audio_enabled);
        assert!(!video.is_screen_sharing);
        assert!(!video.is_muted);
        assert!(!video.has_video);
    }

    #[test]
    fn local_track_lifecycle_drives_device_flags() {
        let mut video = VideoState::new();

        video.track_stopped(TrackKind::Video, true);
        assert!(!video.is_video_enabled);
        video.track_started(TrackKind::Video, true, true);
        assert!(video.is_video_enabled);

        video.track_stopped(TrackKind::Audio, true);
        assert!(!video.is_audio_enabled);
    }

    #[test]
    fn local_audio_start_resolves_mute_from_enabled() {
        let mut video = VideoState::new();
        video.track_started(TrackKind::Audio, true, false);
        assert!(video.is_audio_enabled);
        assert!(video.is_muted);

        video.track_started(TrackKind::Audio, true, true);
        assert!(!video.is_muted);
    }

    #[test]
    fn remote_video_drives_has_video_only() {
        let mut video = VideoState::new();
        video.track_started(TrackKind::Video, false, true);
        assert!(video.has_video);
        assert!(video.is_video_enabled, "remote video must not touch local flags");

        video.track_stopped(TrackKind::Video, false);
        assert!(!video.has_video);
    }

    #[test]
    fn remote_audio_is_ignored() {
        let mut video = VideoState::new();
        let before = video;
        video.track_started(TrackKind::Audio, false, true);
        video.track_stopped(TrackKind::Audio, false);
        assert_eq!(video, before);
    }
}
