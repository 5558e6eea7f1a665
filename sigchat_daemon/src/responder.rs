//! Rule-based automated responder. Commands mutate only the session's
//! display name; everything else is a pure reply.

use rand::seq::SliceRandom;

pub const DEFAULT_NAME: &str = "Guest";

const HELP_TEXT: &str = "Available commands: /hello, /help, /name [your name], /myname.";
const USAGE_TEXT: &str =
    "Use one of the available commands:\n /hello, /help, /name [your name], /myname.";
const SET_NAME_HINT: &str = "You haven't told me your name yet. Use /name [your name] to set it.";

pub fn process_message(name: &mut String, text: &str) -> String {
    let trimmed = text.trim();
    let lowered = trimmed.to_lowercase();

    if lowered.starts_with('/') {
        let command = lowered.split(' ').next().unwrap_or_default();
        return match command {
            "/help" => HELP_TEXT.to_owned(),
            "/hello" => greeting(name),
            "/name" => set_name(name, trimmed),
            "/myname" => report_name(name),
            _ => "Unknown command. Type /help for help.".to_owned(),
        };
    }

    if lowered.contains("hello") || lowered.contains("hi") {
        return greeting(name);
    }
    if lowered.contains("how are you") {
        return "I'm a computer program, so I'm always fine! And you?".to_owned();
    }
    if lowered.contains("thanks") || lowered.contains("thank you") {
        return "You're welcome! Happy to help.".to_owned();
    }

    USAGE_TEXT.to_owned()
}

fn greeting(name: &str) -> String {
    let greetings = [
        format!("Hello, {name}! How can I help?"),
        format!("Hi, {name}! Nice talking to you."),
        format!("Hey, {name}! All good?"),
    ];

    greetings
        .choose(&mut rand::thread_rng())
        .expect("greetings list is not empty")
        .clone()
}

fn set_name(name: &mut String, text: &str) -> String {
    match text.split_once(' ').map(|(_, rest)| rest.trim()) {
        Some(new_name) if !new_name.is_empty() => {
            *name = new_name.to_owned();
            format!("Got it! I'll call you {new_name} from now on.")
        }
        _ => SET_NAME_HINT.to_owned(),
    }
}

fn report_name(name: &str) -> String {
    if name == DEFAULT_NAME {
        SET_NAME_HINT.to_owned()
    } else {
        format!("Your name is: {name}")
    }
}
