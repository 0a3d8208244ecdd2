//! The conversation transition table.

use crate::session::{ConversationState, PendingOperation, Session};
use crate::templates::{
    self, CITY_PROMPT, CITY_RETRY, CONVERSION_PROMPTS, DIFFERENCE_PROMPT, NEW_CITY_PROMPT,
    TIME_SPEC_PROMPT, TIME_SPEC_RETRY, TIMEOUT_NOTICE, VariantPicker, WHATS_NEXT,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;
use zonebot_core::{CityResolver, MalformedInputPolicy, ResolvedCity, timemath};

/// Discrete menu selections offered alongside replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    NewCity,
    Convert,
    Difference,
    Help,
}

impl MenuAction {
    /// Parse the wire token carried by a menu selection.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "new_city" => Some(Self::NewCity),
            "convert" => Some(Self::Convert),
            "difference" => Some(Self::Difference),
            "help" => Some(Self::Help),
            _ => None,
        }
    }

    /// The wire token for this selection.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::NewCity => "new_city",
            Self::Convert => "convert",
            Self::Difference => "difference",
            Self::Help => "help",
        }
    }
}

/// One inbound signal for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Text(String),
    Menu(MenuAction),
}

/// Which keyboard accompanies a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKind {
    /// Convert / Difference / New City / Help.
    Full,
    /// Convert / Difference / New City (shown after help text).
    Reduced,
    /// Single Restart button (timeout notice).
    Restart,
}

/// What the transport should send back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub messages: Vec<String>,
    pub menu: Option<MenuKind>,
}

impl Reply {
    fn text(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
            menu: None,
        }
    }

    fn with_menu(mut self, menu: MenuKind) -> Self {
        self.menu = Some(menu);
        self
    }
}

/// Strings and policy the engine needs beyond its collaborators.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Shown once on first contact.
    pub welcome_message: String,
    /// Shown for the Help button and `/help`.
    pub description: String,
    /// What to do with malformed `HH:MM AM/PM City` input.
    pub malformed_policy: MalformedInputPolicy,
}

/// The conversation state machine.
///
/// Owns the transition table and is the sole translator of resolver and
/// arithmetic failures into user-visible text; it never panics on user
/// input and never advances state on an unresolved city.
pub struct Engine {
    resolver: Arc<dyn CityResolver>,
    picker: Arc<dyn VariantPicker>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(
        resolver: Arc<dyn CityResolver>,
        picker: Arc<dyn VariantPicker>,
        config: EngineConfig,
    ) -> Self {
        Self {
            resolver,
            picker,
            config,
        }
    }

    /// Drive one transition for `session`.
    pub async fn handle(&self, session: &mut Session, input: Input, now: DateTime<Utc>) -> Reply {
        match input {
            Input::Menu(action) => self.handle_menu(session, action),
            Input::Text(text) => {
                let text = text.trim().to_string();
                match session.state {
                    ConversationState::AwaitingFirstCity | ConversationState::AwaitingNextCity => {
                        self.handle_city(session, &text, now).await
                    }
                    ConversationState::AwaitingConversionTarget => {
                        self.handle_conversion_target(session, &text).await
                    }
                    ConversationState::AwaitingConversionTime => {
                        self.handle_conversion_time(session, &text, now).await
                    }
                    ConversationState::AwaitingDifferenceCity => {
                        self.handle_difference_city(session, &text, now).await
                    }
                }
            }
        }
    }

    /// Explicit restart: clear data, re-enter the initial state.
    ///
    /// First contact gets the welcome text; a restart skips straight to
    /// the city prompt.
    pub fn restart(&self, session: &mut Session, first_contact: bool) -> Reply {
        session.reset();
        let mut messages = Vec::new();
        if first_contact {
            messages.push(self.config.welcome_message.clone());
        }
        messages.push(CITY_PROMPT.to_string());
        Reply {
            messages,
            menu: None,
        }
    }

    /// One-time notice sent when a session's inactivity deadline fires.
    #[must_use]
    pub fn timeout_notice(&self) -> Reply {
        Reply::text(TIMEOUT_NOTICE).with_menu(MenuKind::Restart)
    }

    /// Help text with the reduced follow-up menu; no state change.
    #[must_use]
    pub fn help(&self) -> Reply {
        Reply::text(self.config.description.clone()).with_menu(MenuKind::Reduced)
    }

    fn handle_menu(&self, session: &mut Session, action: MenuAction) -> Reply {
        // Menu buttons only make sense once a city is on record.
        if session.primary_city.is_none() {
            return Reply::text(CITY_PROMPT);
        }

        // Selecting from the menu abandons any half-finished operation.
        session.clear_pending();

        match action {
            MenuAction::NewCity => {
                session.state = ConversationState::AwaitingNextCity;
                Reply::text(NEW_CITY_PROMPT)
            }
            MenuAction::Convert => {
                session.begin_operation(PendingOperation::Convert);
                session.state = ConversationState::AwaitingConversionTarget;
                let prompt = templates::choose(self.picker.as_ref(), &CONVERSION_PROMPTS)
                    .unwrap_or(CONVERSION_PROMPTS[0]);
                Reply::text(prompt)
            }
            MenuAction::Difference => {
                session.begin_operation(PendingOperation::Difference);
                session.state = ConversationState::AwaitingDifferenceCity;
                Reply::text(DIFFERENCE_PROMPT)
            }
            MenuAction::Help => {
                session.state = ConversationState::AwaitingNextCity;
                self.help()
            }
        }
    }

    async fn handle_city(&self, session: &mut Session, text: &str, now: DateTime<Utc>) -> Reply {
        let Ok(city) = self.resolver.resolve(text).await else {
            return Reply::text(CITY_RETRY);
        };

        let status = self.city_status(&city, now);
        let first = session.state == ConversationState::AwaitingFirstCity;
        info!("Session city set to {}", city.display_name);
        session.primary_city = Some(city);
        session.state = ConversationState::AwaitingNextCity;

        if first {
            Reply::text(format!("{status}\n\n{WHATS_NEXT}")).with_menu(MenuKind::Full)
        } else {
            Reply::text(status).with_menu(MenuKind::Full)
        }
    }

    /// Current time + timezone summary, in one of two equivalent phrasings.
    fn city_status(&self, city: &ResolvedCity, now: DateTime<Utc>) -> String {
        let formatted = timemath::format_local_now(now, city.timezone);
        let variants = [
            format!(
                "It's currently {formatted} in {}. Timezone: {} ({})",
                city.display_name, city.abbreviation, city.utc_offset
            ),
            format!(
                "The time in {} right now is {formatted}. Timezone: {} ({})",
                city.display_name, city.abbreviation, city.utc_offset
            ),
        ];
        templates::choose(self.picker.as_ref(), &variants).unwrap_or_default()
    }

    async fn handle_conversion_target(&self, session: &mut Session, text: &str) -> Reply {
        let Ok(city) = self.resolver.resolve(text).await else {
            return Reply::text(CITY_RETRY);
        };

        session.begin_operation(PendingOperation::Convert);
        session.set_secondary_city(city);
        session.state = ConversationState::AwaitingConversionTime;
        Reply::text(TIME_SPEC_PROMPT)
    }

    async fn handle_conversion_time(
        &self,
        session: &mut Session,
        text: &str,
        now: DateTime<Utc>,
    ) -> Reply {
        // Expected shape: "HH:MM AM/PM City", city may contain spaces.
        let parts: Vec<&str> = text.splitn(3, ' ').collect();
        let [clock, meridiem, source_text] = parts.as_slice() else {
            return self.malformed(session);
        };

        let Ok(time) = timemath::parse_clock_time(&format!("{clock} {meridiem}")) else {
            return self.malformed(session);
        };

        let Ok(source) = self.resolver.resolve(source_text.trim()).await else {
            // Unresolved city never advances state.
            return Reply::text(CITY_RETRY);
        };

        let Some(target) = session.secondary_city().cloned() else {
            // Conversion target lost (e.g. session restored mid-operation):
            // nothing sensible to convert into, back to the menu.
            session.clear_pending();
            session.state = ConversationState::AwaitingNextCity;
            return Reply::text(WHATS_NEXT).with_menu(MenuKind::Full);
        };

        let Ok(converted) = timemath::convert_clock_time(time, source.timezone, target.timezone, now)
        else {
            return self.malformed(session);
        };

        session.clear_pending();
        session.state = ConversationState::AwaitingNextCity;
        Reply::text(format!(
            "The time in {} is {}.",
            target.display_name,
            timemath::format_clock_time(converted)
        ))
        .with_menu(MenuKind::Full)
    }

    async fn handle_difference_city(
        &self,
        session: &mut Session,
        text: &str,
        now: DateTime<Utc>,
    ) -> Reply {
        let Some(primary) = session.primary_city.clone() else {
            session.state = ConversationState::AwaitingFirstCity;
            return Reply::text(CITY_PROMPT);
        };

        let Ok(other) = self.resolver.resolve(text).await else {
            return Reply::text(format!(
                "Sorry, I couldn't recognize {text} as a city. Please enter another city name:"
            ));
        };

        let delta = timemath::difference_hours(primary.timezone, other.timezone, now);
        session.clear_pending();
        session.state = ConversationState::AwaitingNextCity;

        let message = if delta.abs() < timemath::NO_DIFFERENCE_EPSILON_HOURS {
            format!(
                "There is no time difference between {} and {}.",
                primary.display_name, other.display_name
            )
        } else if delta > 0.0 {
            format!(
                "The time in {} is {} hours ahead of {} time.",
                other.display_name,
                timemath::format_hours(delta),
                primary.display_name
            )
        } else {
            format!(
                "The time in {} is {} hours behind {} time.",
                other.display_name,
                timemath::format_hours(-delta),
                primary.display_name
            )
        };

        Reply::text(message).with_menu(MenuKind::Full)
    }

    /// Apply the configured malformed-input policy.
    fn malformed(&self, session: &mut Session) -> Reply {
        match self.config.malformed_policy {
            MalformedInputPolicy::Reprompt => Reply::text(TIME_SPEC_RETRY),
            MalformedInputPolicy::ReturnToMenu => {
                session.clear_pending();
                session.state = ConversationState::AwaitingNextCity;
                Reply::text(TIME_SPEC_RETRY).with_menu(MenuKind::Full)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use zonebot_core::{ResolveError, canonical_city_name};

    /// Resolver fixture over DST-free fixed-offset zones.
    struct StubResolver;

    #[async_trait]
    impl CityResolver for StubResolver {
        async fn resolve(&self, text: &str) -> Result<ResolvedCity, ResolveError> {
            let zone = match text.to_lowercase().as_str() {
                // POSIX-style ids: Etc/GMT+5 is UTC-5, Etc/GMT-2 is UTC+2.
                "quito" => "Etc/GMT+5",
                "cairo" => "Etc/GMT-2",
                "greenwich" => "Etc/GMT",
                _ => return Err(ResolveError::NotFound(text.to_string())),
            };
            let timezone = zone
                .parse()
                .map_err(|_| ResolveError::NotFound(text.to_string()))?;
            Ok(ResolvedCity {
                query: text.to_string(),
                display_name: canonical_city_name(text),
                timezone,
                utc_offset: timemath::utc_offset(timezone, fixed_now()),
                abbreviation: timemath::zone_abbreviation(timezone, fixed_now()),
            })
        }
    }

    /// Deterministic picker.
    struct Fixed(usize);

    impl VariantPicker for Fixed {
        fn pick(&self, _n: usize) -> usize {
            self.0
        }
    }

    #[expect(clippy::expect_used, reason = "fixture date is statically valid")]
    fn fixed_now() -> DateTime<Utc> {
        let naive = NaiveDate::from_ymd_opt(2024, 1, 15)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .expect("valid fixture date");
        DateTime::from_naive_utc_and_offset(naive, Utc)
    }

    fn engine_with(picker: usize, policy: MalformedInputPolicy) -> Engine {
        Engine::new(
            Arc::new(StubResolver),
            Arc::new(Fixed(picker)),
            EngineConfig {
                welcome_message: "Welcome!".to_string(),
                description: "I answer timezone questions.".to_string(),
                malformed_policy: policy,
            },
        )
    }

    fn engine() -> Engine {
        engine_with(0, MalformedInputPolicy::Reprompt)
    }

    fn text(s: &str) -> Input {
        Input::Text(s.to_string())
    }

    async fn session_with_city(engine: &Engine) -> Session {
        let mut session = Session::new(fixed_now());
        engine
            .handle(&mut session, text("quito"), fixed_now())
            .await;
        session
    }

    #[tokio::test]
    async fn first_city_transitions_and_stores_primary() {
        let engine = engine();
        let mut session = Session::new(fixed_now());

        let reply = engine
            .handle(&mut session, text("quito"), fixed_now())
            .await;

        assert_eq!(session.state, ConversationState::AwaitingNextCity);
        assert_eq!(
            session.primary_city.as_ref().map(|c| c.display_name.as_str()),
            Some("Quito")
        );
        assert_eq!(reply.menu, Some(MenuKind::Full));
        assert!(reply.messages[0].contains("Quito"));
        assert!(reply.messages[0].contains(WHATS_NEXT));
    }

    #[tokio::test]
    async fn unresolvable_city_leaves_state_unchanged() {
        let engine = engine();
        let mut session = Session::new(fixed_now());
        let token_before = session.activity_token();

        let reply = engine
            .handle(&mut session, text("atlantis"), fixed_now())
            .await;

        assert_eq!(session.state, ConversationState::AwaitingFirstCity);
        assert!(session.primary_city.is_none());
        assert_eq!(session.activity_token(), token_before);
        assert!(reply.messages[0].contains("couldn't recognize"));
        assert_eq!(reply.menu, None);
    }

    #[tokio::test]
    async fn new_city_replaces_primary() {
        let engine = engine();
        let mut session = session_with_city(&engine).await;

        let reply = engine
            .handle(&mut session, text("cairo"), fixed_now())
            .await;

        assert_eq!(
            session.primary_city.as_ref().map(|c| c.display_name.as_str()),
            Some("Cairo")
        );
        assert_eq!(session.state, ConversationState::AwaitingNextCity);
        assert_eq!(reply.menu, Some(MenuKind::Full));
    }

    #[tokio::test]
    async fn menu_before_any_city_reprompts() {
        let engine = engine();
        let mut session = Session::new(fixed_now());

        let reply = engine
            .handle(&mut session, Input::Menu(MenuAction::Convert), fixed_now())
            .await;

        assert_eq!(session.state, ConversationState::AwaitingFirstCity);
        assert_eq!(reply.messages[0], CITY_PROMPT);
    }

    #[tokio::test]
    async fn convert_menu_prompts_for_target() {
        let engine = engine();
        let mut session = session_with_city(&engine).await;

        let reply = engine
            .handle(&mut session, Input::Menu(MenuAction::Convert), fixed_now())
            .await;

        assert_eq!(session.state, ConversationState::AwaitingConversionTarget);
        assert_eq!(session.pending_operation(), PendingOperation::Convert);
        assert_eq!(reply.messages[0], CONVERSION_PROMPTS[0]);
    }

    #[tokio::test]
    async fn help_shows_description_with_reduced_menu() {
        let engine = engine();
        let mut session = session_with_city(&engine).await;

        let reply = engine
            .handle(&mut session, Input::Menu(MenuAction::Help), fixed_now())
            .await;

        assert_eq!(session.state, ConversationState::AwaitingNextCity);
        assert_eq!(reply.messages[0], "I answer timezone questions.");
        assert_eq!(reply.menu, Some(MenuKind::Reduced));
    }

    #[tokio::test]
    async fn conversion_flow_converts_between_zones() {
        let engine = engine();
        let mut session = session_with_city(&engine).await;

        engine
            .handle(&mut session, Input::Menu(MenuAction::Convert), fixed_now())
            .await;
        engine
            .handle(&mut session, text("quito"), fixed_now())
            .await;
        assert_eq!(session.state, ConversationState::AwaitingConversionTime);
        assert!(session.secondary_city().is_some());

        // 10:00 AM in Cairo (UTC+2) is 03:00 AM in Quito (UTC-5).
        let reply = engine
            .handle(&mut session, text("10:00 AM cairo"), fixed_now())
            .await;

        assert_eq!(reply.messages[0], "The time in Quito is 03:00 AM.");
        assert_eq!(reply.menu, Some(MenuKind::Full));
        assert_eq!(session.state, ConversationState::AwaitingNextCity);
        assert_eq!(session.pending_operation(), PendingOperation::None);
        assert!(session.secondary_city().is_none());
    }

    #[tokio::test]
    async fn malformed_time_reprompts_in_place_by_default() {
        let engine = engine();
        let mut session = session_with_city(&engine).await;
        engine
            .handle(&mut session, Input::Menu(MenuAction::Convert), fixed_now())
            .await;
        engine
            .handle(&mut session, text("quito"), fixed_now())
            .await;

        for bad in ["10:00AM cairo", "10:00 cairo", "soon"] {
            let reply = engine.handle(&mut session, text(bad), fixed_now()).await;
            assert_eq!(session.state, ConversationState::AwaitingConversionTime);
            assert!(session.secondary_city().is_some());
            assert_eq!(reply.messages[0], TIME_SPEC_RETRY);
        }
    }

    #[tokio::test]
    async fn malformed_time_can_fall_back_to_menu() {
        let engine = engine_with(0, MalformedInputPolicy::ReturnToMenu);
        let mut session = session_with_city(&engine).await;
        engine
            .handle(&mut session, Input::Menu(MenuAction::Convert), fixed_now())
            .await;
        engine
            .handle(&mut session, text("quito"), fixed_now())
            .await;

        let reply = engine
            .handle(&mut session, text("10:00AM cairo"), fixed_now())
            .await;

        assert_eq!(session.state, ConversationState::AwaitingNextCity);
        assert_eq!(session.pending_operation(), PendingOperation::None);
        assert!(session.secondary_city().is_none());
        assert_eq!(reply.menu, Some(MenuKind::Full));
    }

    #[tokio::test]
    async fn unknown_source_city_keeps_awaiting_time() {
        let engine = engine();
        let mut session = session_with_city(&engine).await;
        engine
            .handle(&mut session, Input::Menu(MenuAction::Convert), fixed_now())
            .await;
        engine
            .handle(&mut session, text("quito"), fixed_now())
            .await;

        let reply = engine
            .handle(&mut session, text("10:00 AM atlantis"), fixed_now())
            .await;

        assert_eq!(session.state, ConversationState::AwaitingConversionTime);
        assert!(session.secondary_city().is_some());
        assert!(reply.messages[0].contains("couldn't recognize"));
    }

    #[tokio::test]
    async fn difference_reports_signed_phrasing() {
        let engine = engine();
        let mut session = session_with_city(&engine).await; // primary: Quito, UTC-5
        engine
            .handle(
                &mut session,
                Input::Menu(MenuAction::Difference),
                fixed_now(),
            )
            .await;
        assert_eq!(session.state, ConversationState::AwaitingDifferenceCity);

        let reply = engine
            .handle(&mut session, text("cairo"), fixed_now())
            .await;

        assert_eq!(
            reply.messages[0],
            "The time in Cairo is 7 hours ahead of Quito time."
        );
        assert_eq!(session.state, ConversationState::AwaitingNextCity);
        assert_eq!(session.pending_operation(), PendingOperation::None);
    }

    #[tokio::test]
    async fn same_zone_difference_reports_none() {
        let engine = engine();
        let mut session = session_with_city(&engine).await;
        engine
            .handle(
                &mut session,
                Input::Menu(MenuAction::Difference),
                fixed_now(),
            )
            .await;

        let reply = engine
            .handle(&mut session, text("quito"), fixed_now())
            .await;

        assert_eq!(
            reply.messages[0],
            "There is no time difference between Quito and Quito."
        );
    }

    #[tokio::test]
    async fn restart_skips_welcome_after_first_contact() {
        let engine = engine();
        let mut session = session_with_city(&engine).await;

        let first = engine.restart(&mut Session::new(fixed_now()), true);
        assert_eq!(first.messages, vec!["Welcome!", CITY_PROMPT]);

        let again = engine.restart(&mut session, false);
        assert_eq!(again.messages, vec![CITY_PROMPT]);
        assert_eq!(session.state, ConversationState::AwaitingFirstCity);
        assert!(session.primary_city.is_none());
    }

    #[tokio::test]
    async fn variant_choice_never_affects_state_or_data() {
        for picker in [0, 1] {
            let engine = engine_with(picker, MalformedInputPolicy::Reprompt);
            let mut session = Session::new(fixed_now());
            engine
                .handle(&mut session, text("quito"), fixed_now())
                .await;
            engine
                .handle(&mut session, Input::Menu(MenuAction::Convert), fixed_now())
                .await;

            assert_eq!(session.state, ConversationState::AwaitingConversionTarget);
            assert_eq!(session.pending_operation(), PendingOperation::Convert);
        }
    }

    #[tokio::test]
    async fn timeout_notice_offers_restart() {
        let engine = engine();
        let reply = engine.timeout_notice();
        assert_eq!(reply.menu, Some(MenuKind::Restart));
    }
}
