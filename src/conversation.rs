//! Conversation state machine.
//!
//! `transition` is pure apart from the timestamp and id stamped on a
//! confirmed order: it reads the current session and the inbound text and
//! returns the next session, the reply, and any order to hand off.
//!
//! Keywords match by substring containment over the normalized text, so
//! "quero ver o cardapio" counts as a menu request and any message
//! containing "oi" counts as a greeting.

use crate::menu::{Menu, MenuItem};
use crate::order::{self, Order};
use crate::replies;
use crate::session::{ConversationState, Session};

pub const MENU_KEYWORDS: &[&str] = &["cardapio", "cardápio", "menu"];
pub const GREETING_KEYWORDS: &[&str] = &["oi", "olá", "bom dia", "boa tarde", "boa noite"];
pub const SKIP_BEVERAGE_KEYWORDS: &[&str] = &["nao", "não", "finalizar"];
pub const CONFIRM_KEYWORDS: &[&str] = &["confirmar", "confirmo", "sim"];
pub const CANCEL_KEYWORDS: &[&str] = &["cancelar", "alterar"];

/// Shortest text accepted as a delivery address, in characters.
pub const MIN_ADDRESS_LEN: usize = 10;

/// An inbound message, trimmed and case-folded for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    text: String,
    normalized: String,
}

impl Inbound {
    pub fn new(text: &str) -> Self {
        let text = text.trim().to_string();
        let normalized = text.to_lowercase();
        Self { text, normalized }
    }

    /// Trimmed text with the customer's casing.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn mentions(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|keyword| self.normalized.contains(keyword))
    }

    pub fn number(&self) -> Option<i64> {
        self.normalized.parse().ok()
    }
}

/// What an inbound message means in the session's current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    ShowMenu,
    Greet,
    Meal(MenuItem),
    Beverage(MenuItem),
    SkipBeverage,
    Address(String),
    Confirm,
    Cancel,
    Unrecognized,
}

impl Intent {
    /// Menu requests win over everything, then greetings (or a session that
    /// has not started yet), then whatever the current state accepts.
    pub fn classify(state: ConversationState, input: &Inbound, menu: &Menu) -> Self {
        if input.mentions(MENU_KEYWORDS) {
            return Intent::ShowMenu;
        }
        if input.mentions(GREETING_KEYWORDS) || state == ConversationState::Initial {
            return Intent::Greet;
        }

        match state {
            ConversationState::Initial => Intent::Greet,
            ConversationState::SelectingMeal => input
                .number()
                .and_then(|n| menu.find_meal_by_position(n))
                .map(|meal| Intent::Meal(meal.clone()))
                .unwrap_or(Intent::Unrecognized),
            ConversationState::SelectingBeverage => {
                if input.mentions(SKIP_BEVERAGE_KEYWORDS) {
                    return Intent::SkipBeverage;
                }
                input
                    .number()
                    .and_then(|n| menu.find_beverage_by_position(n))
                    .map(|drink| Intent::Beverage(drink.clone()))
                    .unwrap_or(Intent::Unrecognized)
            }
            ConversationState::CollectingAddress => {
                if input.text().chars().count() >= MIN_ADDRESS_LEN {
                    Intent::Address(input.text().to_string())
                } else {
                    Intent::Unrecognized
                }
            }
            ConversationState::Confirming => {
                if input.mentions(CONFIRM_KEYWORDS) {
                    Intent::Confirm
                } else if input.mentions(CANCEL_KEYWORDS) {
                    Intent::Cancel
                } else {
                    Intent::Unrecognized
                }
            }
        }
    }
}

/// Side effects the caller runs once the new session is committed.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    PlaceOrder(Order),
}

#[derive(Debug)]
pub struct Transition {
    pub session: Session,
    pub reply: String,
    pub effect: Option<Effect>,
}

impl Transition {
    fn new(session: Session, reply: String) -> Self {
        Self {
            session,
            reply,
            effect: None,
        }
    }

    fn with_effect(mut self, effect: Effect) -> Self {
        self.effect = Some(effect);
        self
    }
}

pub fn transition(current: &Session, input: &Inbound, menu: &Menu) -> Transition {
    let intent = Intent::classify(current.state(), input, menu);
    let mut session = current.clone();

    use ConversationState as S;
    match (current.state(), intent) {
        (_, Intent::ShowMenu) => Transition::new(session, replies::catalog(menu)),

        (_, Intent::Greet) => {
            session.start_order();
            Transition::new(session, replies::welcome(menu))
        }

        (S::SelectingMeal, Intent::Meal(meal)) => {
            let reply = replies::meal_chosen(&meal, menu);
            session.choose_meal(meal);
            Transition::new(session, reply)
        }
        (S::SelectingMeal, _) => Transition::new(session, replies::meal_reprompt(menu)),

        (S::SelectingBeverage, Intent::SkipBeverage) => {
            session.skip_beverage();
            Transition::new(session, replies::address_request())
        }
        (S::SelectingBeverage, Intent::Beverage(drink)) => {
            let reply = replies::beverage_added(&drink);
            session.add_beverage(drink);
            Transition::new(session, reply)
        }
        (S::SelectingBeverage, _) => Transition::new(session, replies::beverage_reprompt(menu)),

        (S::CollectingAddress, Intent::Address(address)) => {
            session.collect_address(address, menu.delivery_fee());
            let reply = replies::summary(&session, menu);
            Transition::new(session, reply)
        }
        (S::CollectingAddress, _) => Transition::new(session, replies::address_reprompt()),

        (S::Confirming, Intent::Confirm) => {
            let order = order::finalize(&session);
            let reply = replies::order_confirmed(order.total, menu);
            session.reset();
            Transition::new(session, reply).with_effect(Effect::PlaceOrder(order))
        }
        (S::Confirming, Intent::Cancel) => {
            session.reset();
            Transition::new(session, replies::order_cancelled())
        }
        (S::Confirming, _) => Transition::new(session, replies::confirmation_reprompt()),

        // classify() always greets from Initial
        (S::Initial, _) => {
            session.start_order();
            Transition::new(session, replies::welcome(menu))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::Price;
    use proptest::prelude::*;

    const ADDRESS: &str = "Rua das Flores, 123 - Centro";

    fn step(session: &Session, text: &str) -> Transition {
        transition(session, &Inbound::new(text), &Menu::default())
    }

    fn walk(texts: &[&str]) -> Session {
        texts
            .iter()
            .fold(Session::new("5511900000000@c.us"), |session, text| {
                step(&session, text).session
            })
    }

    #[test]
    fn normalizes_inbound_text() {
        let input = Inbound::new("  Quero o CARDÁPIO \n");
        assert_eq!(input.text(), "Quero o CARDÁPIO");
        assert_eq!(input.normalized(), "quero o cardápio");
        assert!(input.mentions(MENU_KEYWORDS));
        assert_eq!(Inbound::new(" 3 ").number(), Some(3));
        assert_eq!(Inbound::new("3 por favor").number(), None);
    }

    #[test]
    fn any_first_message_starts_the_order() {
        let menu = Menu::default();
        for text in ["quero almoçar", "", "3", "confirmar"] {
            let result = step(&Session::new("c"), text);
            assert_eq!(result.session.state(), ConversationState::SelectingMeal);
            assert_eq!(result.reply, replies::welcome(&menu));
            assert!(result.effect.is_none());
        }
    }

    #[test]
    fn picking_a_meal_fills_the_cart() {
        let session = walk(&["oi"]);
        let result = step(&session, "3");
        assert_eq!(result.session.state(), ConversationState::SelectingBeverage);
        assert_eq!(result.session.cart().len(), 1);
        assert_eq!(result.session.cart()[0].name, "Vegana");
        assert_eq!(result.session.cart()[0].price, Price::from_cents(1300));
    }

    #[test]
    fn invalid_meal_choice_reprompts() {
        let menu = Menu::default();
        let session = walk(&["oi"]);
        for text in ["0", "6", "-1", "tres", "2.5"] {
            let result = step(&session, text);
            assert_eq!(result.session, session, "input {:?}", text);
            assert_eq!(result.reply, replies::meal_reprompt(&menu));
        }
    }

    #[test]
    fn declining_a_beverage_keeps_the_cart() {
        let session = walk(&["oi", "2"]);
        for text in ["nao", "Não, obrigado", "finalizar"] {
            let result = step(&session, text);
            assert_eq!(result.session.state(), ConversationState::CollectingAddress);
            assert_eq!(result.session.cart(), session.cart());
            assert_eq!(result.reply, replies::address_request());
        }
    }

    #[test]
    fn beverage_is_appended() {
        let session = walk(&["oi", "2", "2"]);
        assert_eq!(session.state(), ConversationState::CollectingAddress);
        let names: Vec<_> = session.cart().iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, ["Frango", "Suco Natural"]);

        let stuck = walk(&["oi", "2", "4"]);
        assert_eq!(stuck.state(), ConversationState::SelectingBeverage);
        assert_eq!(stuck.cart().len(), 1);
    }

    #[test]
    fn short_address_is_rejected() {
        let session = walk(&["oi", "1", "nao"]);
        let result = step(&session, "Rua A, 1");
        assert_eq!(result.session, session);
        assert_eq!(result.reply, replies::address_reprompt());
    }

    #[test]
    fn address_produces_summary_with_total() {
        let session = walk(&["oi", "2", "2"]);
        let result = step(&session, ADDRESS);
        assert_eq!(result.session.state(), ConversationState::Confirming);
        assert_eq!(result.session.address(), Some(ADDRESS));
        assert_eq!(result.session.total(), Price::from_cents(2200));
        assert!(result.reply.contains("R$ 22.00"));
        assert!(result.reply.contains("Marmita Frango - R$ 14.00"));
        assert!(result.reply.contains("• Suco Natural - R$ 5.00"));
        assert!(result.reply.contains(ADDRESS));
    }

    #[test]
    fn confirming_emits_one_order_and_resets() {
        let session = walk(&["oi", "2", "2", ADDRESS]);
        let result = step(&session, "confirmar");

        let Some(Effect::PlaceOrder(order)) = result.effect else {
            panic!("expected an order");
        };
        assert_eq!(order.total, Price::from_cents(2200));
        assert_eq!(order.items, session.cart());
        assert_eq!(result.session, Session::new(session.customer_id()));
        assert!(result.reply.contains("PEDIDO CONFIRMADO"));
        assert!(result.reply.contains("R$ 22.00"));
    }

    #[test]
    fn cancelling_never_places_an_order() {
        let session = walk(&["oi", "5", "nao", ADDRESS]);
        let result = step(&session, "cancelar");
        assert!(result.effect.is_none());
        assert_eq!(result.session.state(), ConversationState::Initial);
        assert!(result.session.cart().is_empty());
        assert_eq!(result.reply, replies::order_cancelled());
    }

    #[test]
    fn unclear_confirmation_reprompts() {
        let session = walk(&["oi", "5", "nao", ADDRESS]);
        let result = step(&session, "hmm talvez");
        assert!(result.effect.is_none());
        assert_eq!(result.session, session);
        assert_eq!(result.reply, replies::confirmation_reprompt());
    }

    #[test]
    fn menu_keyword_never_changes_state() {
        let menu = Menu::default();
        let sessions = [
            Session::new("c"),
            walk(&["oi"]),
            walk(&["oi", "1"]),
            walk(&["oi", "1", "nao"]),
            walk(&["oi", "1", "nao", ADDRESS]),
        ];
        for session in &sessions {
            for text in ["cardapio", "MENU", "me manda o cardápio"] {
                let result = step(session, text);
                assert_eq!(&result.session, session);
                assert_eq!(result.reply, replies::catalog(&menu));
            }
        }
    }

    #[test]
    fn greeting_restarts_an_order_in_progress() {
        let session = walk(&["oi", "2", "2", ADDRESS]);
        let result = step(&session, "Boa noite!");
        assert!(result.effect.is_none());
        assert_eq!(result.session.state(), ConversationState::SelectingMeal);
        assert!(result.session.cart().is_empty());
        assert_eq!(result.session.address(), None);
    }

    #[test]
    fn greeting_matches_inside_words() {
        // "biscoito" contains "oi"
        let session = walk(&["oi", "1", "nao"]);
        let result = step(&session, "Rua do Biscoito, 45 - Centro");
        assert_eq!(result.session.state(), ConversationState::SelectingMeal);
    }

    proptest! {
        #[test]
        fn out_of_range_meal_numbers_reprompt(n in any::<i64>().prop_filter("in range", |n| !(1..=5).contains(n))) {
            let session = walk(&["oi"]);
            let result = step(&session, &n.to_string());
            prop_assert_eq!(result.session.state(), ConversationState::SelectingMeal);
            prop_assert!(result.session.cart().is_empty());
            prop_assert_eq!(result.reply, replies::meal_reprompt(&Menu::default()));
        }

        #[test]
        fn cart_invariants_hold_for_any_input(texts in prop::collection::vec("[a-z0-9 ]{0,16}", 0..12)) {
            let mut session = Session::new("c");
            for text in &texts {
                session = step(&session, text).session;
                match session.state() {
                    ConversationState::CollectingAddress => prop_assert!(!session.cart().is_empty()),
                    ConversationState::Confirming => {
                        prop_assert!(!session.cart().is_empty());
                        prop_assert!(session.address().is_some());
                    }
                    _ => {}
                }
            }
        }
    }
}
