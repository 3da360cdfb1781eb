//! Plain-text reports for the terminal

use jf_slot::{EconomySnapshot, Language, Preferences};

use crate::messages::{Text, text};

pub fn economy_lines(language: Language, snapshot: &EconomySnapshot) -> Vec<String> {
    let (spins, wins, biggest, hit_rate) = match language {
        Language::Portuguese => ("Giros", "Vitórias", "Maior prêmio", "Taxa de acerto"),
        Language::English => ("Spins", "Wins", "Biggest win", "Hit rate"),
    };
    vec![
        format!(
            "{}: {}   {}: {}",
            text(language, Text::Credits),
            snapshot.credits,
            text(language, Text::Bet),
            snapshot.bet
        ),
        format!(
            "{spins}: {}   {wins}: {}   {biggest}: {}   {hit_rate}: {:.1}%",
            snapshot.total_spins,
            snapshot.total_wins,
            snapshot.biggest_win,
            snapshot.hit_rate()
        ),
    ]
}

pub fn print_economy(language: Language, snapshot: &EconomySnapshot) {
    for line in economy_lines(language, snapshot) {
        println!("{line}");
    }
}

pub fn preferences_line(prefs: &Preferences) -> String {
    let flag = |on: bool| if on { "on" } else { "off" };
    format!(
        "lang={} sound={} animations={} particles={} vibration={}",
        prefs.language,
        flag(prefs.sound),
        flag(prefs.animations),
        flag(prefs.particles),
        flag(prefs.vibration)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_economy_lines() {
        let snapshot = EconomySnapshot {
            credits: 149,
            bet: 1,
            total_spins: 4,
            total_wins: 1,
            biggest_win: 50,
        };
        let lines = economy_lines(Language::English, &snapshot);
        assert_eq!(lines[0], "Credits: 149   Bet: 1");
        assert!(lines[1].ends_with("Hit rate: 25.0%"));
    }

    #[test]
    fn test_preferences_line() {
        let prefs = Preferences {
            sound: false,
            ..Preferences::default()
        };
        assert_eq!(
            preferences_line(&prefs),
            "lang=pt sound=off animations=on particles=on vibration=on"
        );
    }
}
