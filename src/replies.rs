//! Customer-facing message texts.
//!
//! Every function here is deterministic in its inputs, so the same menu and
//! session always produce the same text.

use std::fmt::Write;

use crate::menu::{Menu, MenuItem, Price};
use crate::session::Session;

fn money(price: Price) -> String {
    format!("R$ {}", price)
}

fn meal_lines(menu: &Menu) -> String {
    menu.list_meals()
        .enumerate()
        .map(|(index, meal)| format!("*{}* - {} - {}\n", index + 1, meal.name, money(meal.price)))
        .collect()
}

fn beverage_lines(menu: &Menu) -> String {
    menu.list_beverages()
        .enumerate()
        .map(|(index, drink)| {
            format!("• Digite *{}* para {} ({})\n", index + 1, drink.name, money(drink.price))
        })
        .collect()
}

pub fn welcome(menu: &Menu) -> String {
    format!(
        "Olá! Seja bem-vindo ao *{}*! 😊\n\n🍱 *NOSSAS MARMITAS:*\n{}\nDigite o *número* da marmita que você quer! 👆",
        menu.restaurant_name(),
        meal_lines(menu)
    )
}

pub fn catalog(menu: &Menu) -> String {
    let mut text = format!(
        "🍱 *CARDÁPIO {}*\n\n*MARMITAS:*\n",
        menu.restaurant_name().to_uppercase()
    );
    for (index, meal) in menu.list_meals().enumerate() {
        let _ = writeln!(text, "*{}* - *{}* - {}", index + 1, meal.label(), money(meal.price));
        if let Some(description) = &meal.description {
            let _ = writeln!(text, "   {}", description);
        }
        text.push('\n');
    }

    text.push_str("💧 *BEBIDAS:*\n");
    for drink in menu.list_beverages() {
        let _ = writeln!(text, "• {} - {}", drink.name, money(drink.price));
    }

    let _ = write!(
        text,
        "\n🚚 *Taxa de entrega: {}*\n⏰ *Entrega em {}*\n\nPara pedir, digite *oi* e eu te ajudo! 😋",
        money(menu.delivery_fee()),
        menu.delivery_window()
    );
    text
}

pub fn meal_chosen(meal: &MenuItem, menu: &Menu) -> String {
    let mut text = format!("Ótima escolha! *{}* por {} 👍\n\n", meal.label(), money(meal.price));
    if let Some(description) = &meal.description {
        let _ = write!(text, "{}\n\n", description);
    }
    let _ = write!(
        text,
        "💧 Quer alguma bebida para acompanhar?\n{}• Digite *nao* se não quiser bebida\n\nOu digite *finalizar* para ir direto para o endereço! 🏠",
        beverage_lines(menu)
    );
    text
}

pub fn meal_reprompt(menu: &Menu) -> String {
    format!(
        "Por favor, digite um número de *1* a *{}* para escolher sua marmita! 😊\n\n{}",
        menu.list_meals().count(),
        meal_lines(menu)
    )
}

pub fn beverage_reprompt(menu: &Menu) -> String {
    format!(
        "Por favor, escolha uma opção:\n{}• Digite *nao* se não quiser bebida",
        beverage_lines(menu)
    )
}

pub fn address_request() -> String {
    "Agora preciso do seu endereço para entrega! 🏠\n\n\
     Por favor, envie seu endereço *completo*:\n\
     • Rua/Avenida e número\n\
     • Bairro\n\
     • Pontos de referência\n\
     • Seu nome para entrega\n\n\
     Exemplo:\n\
     *Rua das Flores, 123 - Centro\n\
     Próximo ao mercado São João\n\
     Nome: João Silva*"
        .to_string()
}

pub fn beverage_added(drink: &MenuItem) -> String {
    format!(
        "Perfeito! Adicionei *{}* no seu pedido! 🥤\n\n{}",
        drink.name,
        address_request()
    )
}

pub fn address_reprompt() -> String {
    "Por favor, envie seu endereço *completo* com:\n\
     • Rua e número\n\
     • Bairro\n\
     • Ponto de referência\n\
     • Seu nome\n\n\
     Isso me ajuda a garantir que a entrega chegue certinho! 😊"
        .to_string()
}

/// Itemized summary shown once the address is in.
pub fn summary(session: &Session, menu: &Menu) -> String {
    let mut text = String::from("🍱 *RESUMO DO SEU PEDIDO:*\n\n");
    for item in session.cart() {
        let _ = writeln!(text, "• {} - {}", item.label(), money(item.price));
    }

    let _ = write!(
        text,
        "\n💰 *VALORES:*\n• Subtotal: {}\n• Taxa de entrega: {}\n• *Total: {}*\n\n",
        money(session.subtotal()),
        money(session.delivery_fee()),
        money(session.total())
    );
    let _ = write!(
        text,
        "🏠 *Endereço de entrega:*\n{}\n\n⏰ *Tempo de entrega: {}*\n\n",
        session.address().unwrap_or_default(),
        menu.delivery_window()
    );
    text.push_str("✅ Digite *confirmar* para finalizar o pedido\n❌ Digite *cancelar* se quiser alterar algo");
    text
}

pub fn confirmation_reprompt() -> String {
    "Por favor, digite:\n✅ *confirmar* para finalizar o pedido\n❌ *cancelar* para fazer alterações"
        .to_string()
}

pub fn order_confirmed(total: Price, menu: &Menu) -> String {
    format!(
        "🎉 *PEDIDO CONFIRMADO!*\n\n\
         Seu pedido foi recebido e já está sendo preparado! 👨‍🍳\n\n\
         📱 Em caso de dúvidas, entre em contato conosco.\n\
         ⏰ Previsão de entrega: {}\n\
         💵 Total: {}\n\n\
         Obrigado pela preferência! 😊\n\
         _{} - Comida feita com carinho_",
        menu.delivery_window(),
        money(total),
        menu.restaurant_name()
    )
}

pub fn order_cancelled() -> String {
    "Pedido cancelado! 😊 Digite *oi* quando quiser fazer um novo pedido!".to_string()
}
