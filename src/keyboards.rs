use teloxide::types::{KeyboardButton, KeyboardMarkup};

pub fn get_confirm_keyboard() -> KeyboardMarkup {
    let keyboard: Vec<Vec<KeyboardButton>> =
        vec![vec![KeyboardButton::new("yes"), KeyboardButton::new("no")]];

    KeyboardMarkup::new(keyboard)
}
