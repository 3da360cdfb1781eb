//! Player-facing text in both supported languages

use jf_slot::{Language, Payouts, Symbol};

/// Message key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Text {
    Welcome,
    Spinning,
    Win,
    Lose,
    Jackpot,
    NoCredits,
    InsufficientCredits,
    Credits,
    Bet,
    Paytable,
    Symbols,
    PlayAgain,
    SpinInProgress,
    Goodbye,
}

/// Text for `key` in `language`
pub fn text(language: Language, key: Text) -> &'static str {
    match language {
        Language::Portuguese => match key {
            Text::Welcome => "Bem-vindo! Pressione ENTER para GIRAR",
            Text::Spinning => "Girando...",
            Text::Win => "Você ganhou!",
            Text::Lose => "Tente novamente!",
            Text::Jackpot => "🎉 JACKPOT! 🎉",
            Text::NoCredits => "Sem créditos! Jogo finalizado.",
            Text::InsufficientCredits => "Créditos insuficientes para esta aposta",
            Text::Credits => "Créditos",
            Text::Bet => "Aposta",
            Text::Paytable => "Tabela de Pagamento",
            Text::Symbols => "Símbolos",
            Text::PlayAgain => "Digite 'reset' para jogar novamente",
            Text::SpinInProgress => "Aguarde, os rolos ainda estão girando",
            Text::Goodbye => "Até logo!",
        },
        Language::English => match key {
            Text::Welcome => "Welcome! Press ENTER to SPIN",
            Text::Spinning => "Spinning...",
            Text::Win => "You won!",
            Text::Lose => "Try again!",
            Text::Jackpot => "🎉 JACKPOT! 🎉",
            Text::NoCredits => "No credits! Game over.",
            Text::InsufficientCredits => "Not enough credits for this bet",
            Text::Credits => "Credits",
            Text::Bet => "Bet",
            Text::Paytable => "Paytable",
            Text::Symbols => "Symbols",
            Text::PlayAgain => "Type 'reset' to play again",
            Text::SpinInProgress => "Hold on, the reels are still spinning",
            Text::Goodbye => "Goodbye!",
        },
    }
}

/// Paytable rendered from the live multipliers
pub fn paytable_lines(language: Language, payouts: &Payouts, jackpot: Symbol) -> Vec<String> {
    let (three, two, bet) = match language {
        Language::Portuguese => ("3 iguais", "2 iguais", "aposta"),
        Language::English => ("3 of a kind", "2 of a kind", "bet"),
    };
    let symbols: Vec<&str> = Symbol::ALL.iter().map(|s| s.glyph()).collect();

    vec![
        format!("── {} ──", text(language, Text::Paytable)),
        format!("{}: {}", text(language, Text::Symbols), symbols.join(" ")),
        format!(
            "{} {} {} = JACKPOT ({}x)",
            jackpot, jackpot, jackpot, payouts.jackpot
        ),
        format!("{three} = {}x {bet}", payouts.three_of_kind),
        format!("{two} = {}x {bet}", payouts.two_of_kind),
    ]
}
