//! Signup form example - coerce submitted strings, then validate the model
//!
//! Run with: cargo run --example signup_form
//! With events: cargo run --example signup_form --features tracing

use chrono::{NaiveDate, TimeDelta};
use stillform::prelude::*;
use stillform::{model, rules};

#[derive(Debug, Default)]
struct Signup {
    username: String,
    email: String,
    password: String,
    confirm_password: String,
    account_type: String,
    age: Option<i64>,
    start_date: Option<NaiveDate>,
    interests: Vec<String>,
}

model!(Signup {
    username,
    email,
    password,
    confirm_password,
    account_type,
    age,
    start_date,
    interests
});

fn signup_validator(today: NaiveDate) -> Validator {
    Validator::new()
        .field(
            "username",
            rules![
                Required::new(),
                Length::between(2, 20).unwrap(),
                Slug::new()
            ],
        )
        .field(
            "email",
            rules![Required::new(), Length::at_most(50), Email::new()],
        )
        .field("password", rules![Required::new(), Length::at_least(8)])
        .field(
            "confirm_password",
            rules![Compare::equal("password").with_message("Passwords do not match.")],
        )
        .field(
            "account_type",
            rules![OneOf::try_new(["user", "business"]).unwrap()],
        )
        .field("age", rules![Range::at_least(18)])
        .field(
            "start_date",
            rules![RelativeDelta::at_least(Clock::Fixed(Value::from(today)), TimeDelta::zero())],
        )
        .field(
            "interests",
            rules![IteratorRule::each(Length::at_most(12))],
        )
}

fn submit(label: &str, input: &RawValues, validator: &Validator) {
    println!("== {} ==", label);

    let mut signup = Signup::default();
    let mut errors = Errors::new();
    let updated = try_update_model(&mut signup, input, &mut errors, &NoTranslation);
    // Coercion failures do not stop validation.
    let valid = validator.validate(&signup, &mut errors) && updated;

    if valid {
        println!("accepted: {:?}", signup);
        return;
    }
    for (field, messages) in errors.iter() {
        for message in messages {
            println!("  {}: {}", field, message);
        }
    }
}

fn main() {
    #[cfg(feature = "tracing")]
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let today = chrono::Local::now().date_naive();
    let validator = signup_validator(today);
    let tomorrow = (today + TimeDelta::days(1)).format("%Y/%m/%d").to_string();

    let good = RawValues::from([
        ("username".to_string(), "john_doe".into()),
        ("email".to_string(), "john@example.org".into()),
        ("password".to_string(), "correct horse".into()),
        ("confirm_password".to_string(), "correct horse".into()),
        ("account_type".to_string(), "user".into()),
        ("age".to_string(), "33".into()),
        ("start_date".to_string(), tomorrow.as_str().into()),
        ("interests".to_string(), vec!["chess", "rust"].into()),
    ]);
    submit("valid signup", &good, &validator);

    let bad = RawValues::from([
        ("username".to_string(), "j d".into()),
        ("email".to_string(), "john@".into()),
        ("password".to_string(), "short".into()),
        ("confirm_password".to_string(), "shorter".into()),
        ("account_type".to_string(), "admin".into()),
        ("age".to_string(), "thirty".into()),
        ("start_date".to_string(), "next week".into()),
        ("interests".to_string(), vec!["chess", "competitive programming"].into()),
    ]);
    submit("invalid signup", &bad, &validator);
}
