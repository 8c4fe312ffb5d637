use crate::host::Console;
use crate::programs::{CallResult, Program};
use cshowcase::kernel::UnitValue;
use std::time::{SystemTime, UNIX_EPOCH};

const TRIES: u32 = 8;
const DIGITS: usize = 3;
const RANGE: u8 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Playing,
    Won,
    Lost,
}

pub struct Minigame {
    fixed_secret: Option<[u8; DIGITS]>,
    secret: [u8; DIGITS],
    remaining: u32,
    outcome: Outcome,
}

impl Minigame {
    pub fn from_env() -> Self {
        let fixed_secret = std::env::var("CSHOWCASE_UNIT_SECRET")
            .ok()
            .and_then(|v| parse_code(v.trim()));
        Self {
            fixed_secret,
            secret: [0; DIGITS],
            remaining: TRIES,
            outcome: Outcome::Playing,
        }
    }

    fn code(&self) -> String {
        self.secret.iter().map(|d| d.to_string()).collect()
    }

    fn init(&mut self, console: &mut dyn Console) {
        self.secret = self.fixed_secret.unwrap_or_else(random_code);
        self.remaining = TRIES;
        self.outcome = Outcome::Playing;
        console.println("Welcome to the Code Guessing Minigame!");
        console.println(&format!(
            "Try to guess the {DIGITS}-digit secret code. Digits are between 0 and {RANGE}."
        ));
        console.println(&format!(
            "{} tries remaining. Enter your guess:",
            self.remaining
        ));
    }

    fn guess(&mut self, console: &mut dyn Console, input: &str) {
        match self.outcome {
            Outcome::Won => {
                console.println("Game is over. Please initialize a new game.");
                console.println("You already won!");
                return;
            }
            Outcome::Lost => {
                console.println("Game is over. Please initialize a new game.");
                console.println(&format!("You already lost. The code was: {}", self.code()));
                return;
            }
            Outcome::Playing => {}
        }

        console.println(&format!("Processing guess: {input}"));

        let len = input.chars().count();
        if len != DIGITS {
            console.println(&format!(
                "Invalid input length. Please enter exactly {DIGITS} digits. You entered {len}."
            ));
            return;
        }
        let Some(guess) = parse_code(input) else {
            console.println("Invalid input. Enter only digits.");
            return;
        };

        self.remaining -= 1;

        let mut in_place = 0;
        let mut misplaced = 0;
        for i in 0..DIGITS {
            if guess[i] == self.secret[i] {
                in_place += 1;
            } else if (0..DIGITS).any(|j| j != i && guess[i] == self.secret[j]) {
                misplaced += 1;
            }
        }

        if in_place == DIGITS {
            console.println(&format!("You opened the vault! The code was: {}", self.code()));
            self.outcome = Outcome::Won;
            return;
        }

        let direction = if to_number(&guess) > to_number(&self.secret) {
            "Too high."
        } else {
            "Too low."
        };
        console.println(&format!(
            "{direction} {in_place} correct digit(s) in the right place, {misplaced} correct digit(s) in the wrong place."
        ));

        if self.remaining > 0 {
            console.println(&format!(
                "{} tries remaining. Enter your guess:",
                self.remaining
            ));
        } else {
            console.println("You've run out of tries. Game over.");
            console.println(&format!("The correct code was: {}", self.code()));
            self.outcome = Outcome::Lost;
        }
    }
}

impl Program for Minigame {
    fn exports(&self) -> &'static [&'static str] {
        &["init_minigame", "process_minigame_guess"]
    }

    fn call(&mut self, console: &mut dyn Console, name: &str, args: &[UnitValue]) -> CallResult {
        match name {
            "init_minigame" => self.init(console),
            _ => self.guess(console, crate::text_arg(args).trim()),
        }
        Ok(None)
    }
}

fn parse_code(input: &str) -> Option<[u8; DIGITS]> {
    let digits: Vec<u8> = input
        .chars()
        .map(|c| c.to_digit(10).map(|d| d as u8))
        .collect::<Option<_>>()?;
    digits.try_into().ok()
}

fn to_number(code: &[u8; DIGITS]) -> u32 {
    code.iter().fold(0, |acc, d| acc * 10 + u32::from(*d))
}

fn random_code() -> [u8; DIGITS] {
    let mut seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() as u64 ^ d.as_secs())
        .unwrap_or(0x2545_f491)
        | 1;
    let mut code = [0u8; DIGITS];
    for digit in &mut code {
        // xorshift64
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        *digit = (seed % (u64::from(RANGE) + 1)) as u8;
    }
    code
}
