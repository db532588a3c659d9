//! Redaction of one party's contact details before showing them to another.

use super::ActorContact;

/// Mask an email address or phone number.
///
/// Emails keep the first and last character of the local part and the full
/// domain. A local part of two characters or fewer cannot be masked and is
/// returned as is. Phone numbers keep their last two digits.
pub fn mask_contact(address: &str) -> String {
    let address = address.trim();
    match address.rsplit_once('@') {
        Some((local, domain)) => mask_email(local, domain),
        None => mask_phone(address),
    }
}

fn mask_email(local: &str, domain: &str) -> String {
    let chars: Vec<char> = local.chars().collect();
    if chars.len() <= 2 {
        return format!("{}@{}", local, domain);
    }

    let mut masked = String::with_capacity(local.len() + domain.len() + 1);
    masked.push(chars[0]);
    masked.extend(std::iter::repeat('*').take(chars.len() - 2));
    masked.push(chars[chars.len() - 1]);
    masked.push('@');
    masked.push_str(domain);
    masked
}

fn mask_phone(number: &str) -> String {
    let digits = number.chars().filter(char::is_ascii_digit).count();
    if digits <= 4 {
        return number.to_string();
    }

    let mut remaining = digits;
    number
        .chars()
        .map(|c| {
            if c.is_ascii_digit() {
                remaining -= 1;
                if remaining < 2 {
                    c
                } else {
                    '*'
                }
            } else {
                c
            }
        })
        .collect()
}

/// A third party's contact as it may be shown to the owner.
///
/// Built only through [`MaskedContact::from_actor`], so owner-facing
/// templates never see raw addresses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaskedContact {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
}

impl MaskedContact {
    pub fn from_actor(actor: &ActorContact) -> Self {
        Self {
            name: actor.name().map(str::to_string),
            email: actor.email().map(mask_contact),
            phone: actor.phone().map(mask_contact),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn has_reachable_contact(&self) -> bool {
        self.email.is_some() || self.phone.is_some()
    }
}
