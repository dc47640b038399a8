use std::collections::HashMap;

use serde::Serialize;

// ─── Menu ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct MenuItem {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub price: f64,
}

static MENU: &[(&str, &str, f64)] = &[
    ("Veggie", "A garden of delight", 11.50),
    ("Pepperoni", "Spicy treat", 12.99),
    ("Margarita", "Essential classic", 10.75),
    ("Crusty", "A dry mouthed favorite", 9.25),
    ("Charred Leopard", "For those with a darker side", 14.00),
];

pub fn menu() -> Vec<MenuItem> {
    MENU.iter()
        .enumerate()
        .map(|(i, &(title, description, price))| MenuItem {
            id: i as u32 + 1,
            title: title.into(),
            description: description.into(),
            price,
        })
        .collect()
}

// ─── Users ───────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct User {
    pub name: String,
    pub email: String,
    password: String,
}

/// In-memory user set seeded at startup. Read-only after construction.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    by_email: HashMap<String, User>,
}

static USERS: &[(&str, &str, &str)] = &[
    ("pizza diner", "d@jwt.com", "diner"),
    ("pizza franchisee", "f@jwt.com", "franchisee"),
    ("pizza admin", "a@jwt.com", "admin"),
];

impl UserDirectory {
    pub fn seeded() -> Self {
        let by_email = USERS
            .iter()
            .map(|&(name, email, password)| {
                (
                    email.to_owned(),
                    User {
                        name: name.into(),
                        email: email.into(),
                        password: password.into(),
                    },
                )
            })
            .collect();
        Self { by_email }
    }

    /// The user, if the credentials match.
    pub fn authenticate(&self, email: &str, password: &str) -> Option<&User> {
        self.by_email
            .get(email)
            .filter(|u| u.password == password)
    }
}
