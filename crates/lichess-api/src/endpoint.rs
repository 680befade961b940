//! Endpoint table for the lichess bot API
//!
//! Static mapping from symbolic operation names to URL path templates with
//! positional placeholders, immutable for the process lifetime.

/// Remote endpoints, one variant per API operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    Profile,
    Playing,
    GameStream { game_id: &'a str },
    EventStream,
    Game { game_id: &'a str },
    Move { game_id: &'a str, mv: &'a str },
    Chat { game_id: &'a str },
    Abort { game_id: &'a str },
    AcceptChallenge { challenge_id: &'a str },
    DeclineChallenge { challenge_id: &'a str },
    CreateChallenge { opponent: &'a str },
    CancelChallenge { challenge_id: &'a str },
    Upgrade,
    Resign { game_id: &'a str },
}

impl Endpoint<'_> {
    /// Render the path template with its identifiers substituted.
    pub fn path(&self) -> String {
        match self {
            Self::Profile => "/api/account".to_string(),
            Self::Playing => "/api/account/playing".to_string(),
            Self::GameStream { game_id } => format!("/api/bot/game/stream/{game_id}"),
            Self::EventStream => "/api/stream/event".to_string(),
            Self::Game { game_id } => format!("/api/bot/game/{game_id}"),
            Self::Move { game_id, mv } => format!("/api/bot/game/{game_id}/move/{mv}"),
            Self::Chat { game_id } => format!("/api/bot/game/{game_id}/chat"),
            Self::Abort { game_id } => format!("/api/bot/game/{game_id}/abort"),
            Self::AcceptChallenge { challenge_id } => format!("/api/challenge/{challenge_id}/accept"),
            Self::DeclineChallenge { challenge_id } => {
                format!("/api/challenge/{challenge_id}/decline")
            }
            // No leading slash; still resolves to /api/challenge/{opponent}
            // against a host-only base URL.
            Self::CreateChallenge { opponent } => format!("api/challenge/{opponent}"),
            Self::CancelChallenge { challenge_id } => {
                format!("/api/challenge/{challenge_id}/cancel")
            }
            Self::Upgrade => "/api/bot/account/upgrade".to_string(),
            Self::Resign { game_id } => format!("/api/bot/game/{game_id}/resign"),
        }
    }
}
