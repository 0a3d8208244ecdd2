use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use zonebot_conversation::{MenuAction, MenuKind};

/// Callback token for the restart affordance on the timeout notice.
pub(crate) const RESTART_TOKEN: &str = "restart";

fn action_button(label: &str, action: MenuAction) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label, action.token())
}

/// Inline keyboard layout for a reply menu.
pub(crate) fn markup(menu: MenuKind) -> InlineKeyboardMarkup {
    match menu {
        MenuKind::Full => InlineKeyboardMarkup::new([
            vec![
                action_button("Convert", MenuAction::Convert),
                action_button("Difference", MenuAction::Difference),
            ],
            vec![
                action_button("New City", MenuAction::NewCity),
                action_button("Help", MenuAction::Help),
            ],
        ]),
        MenuKind::Reduced => InlineKeyboardMarkup::new([
            vec![
                action_button("Convert", MenuAction::Convert),
                action_button("Difference", MenuAction::Difference),
            ],
            vec![action_button("New City", MenuAction::NewCity)],
        ]),
        MenuKind::Restart => InlineKeyboardMarkup::new([vec![InlineKeyboardButton::callback(
            "Restart",
            RESTART_TOKEN,
        )]]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_menu_has_four_buttons_in_two_rows() {
        let markup = markup(MenuKind::Full);
        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[0].len(), 2);
        assert_eq!(markup.inline_keyboard[1].len(), 2);
    }

    #[test]
    fn reduced_menu_drops_the_help_button() {
        let markup = markup(MenuKind::Reduced);
        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[1].len(), 1);
    }

    #[test]
    fn callback_tokens_round_trip_through_menu_action() {
        for action in [
            MenuAction::NewCity,
            MenuAction::Convert,
            MenuAction::Difference,
            MenuAction::Help,
        ] {
            assert_eq!(MenuAction::parse(action.token()), Some(action));
        }
        assert_eq!(MenuAction::parse(RESTART_TOKEN), None);
    }
}
