use crate::host::Console;
use cshowcase::kernel::UnitValue;

pub type CallResult = Result<Option<UnitValue>, String>;

pub trait Program {
    fn exports(&self) -> &'static [&'static str];

    fn has_main(&self) -> bool {
        false
    }

    fn call(&mut self, console: &mut dyn Console, name: &str, args: &[UnitValue]) -> CallResult;
}

pub enum Setup {
    Program(fn() -> Box<dyn Program>),
    /// Answers the handshake with a result of the wrong shape.
    Malformed,
    /// Exits before reading the handshake.
    Crash,
    /// Writes unframed text where the handshake reply belongs.
    Garbage,
}

pub fn lookup(name: &str) -> Option<Setup> {
    let make: fn() -> Box<dyn Program> = match name {
        "inventory" => || -> Box<dyn Program> { Box::new(crate::inventory::Inventory::default()) },
        "jukebox" => || -> Box<dyn Program> { Box::new(crate::jukebox::Jukebox::from_env()) },
        "minigame" => || -> Box<dyn Program> { Box::new(crate::minigame::Minigame::from_env()) },
        "grades" => || -> Box<dyn Program> { Box::new(crate::grades::Grades::default()) },
        "echo" => || -> Box<dyn Program> { Box::new(Echo) },
        "main-only" => || -> Box<dyn Program> { Box::new(MainOnly) },
        "bare" => || -> Box<dyn Program> { Box::new(Bare) },
        "raise" => || -> Box<dyn Program> { Box::new(Raise) },
        "malformed" => return Some(Setup::Malformed),
        "crash" => return Some(Setup::Crash),
        "garbage" => return Some(Setup::Garbage),
        _ => return None,
    };
    Some(Setup::Program(make))
}

/// Prints its input back; `err:` lines go to the error stream.
struct Echo;

impl Program for Echo {
    fn exports(&self) -> &'static [&'static str] {
        &["init_echo", "process_echo_input"]
    }

    fn call(&mut self, console: &mut dyn Console, name: &str, args: &[UnitValue]) -> CallResult {
        match name {
            "init_echo" => console.println("echo ready"),
            _ => {
                let text = crate::text_arg(args);
                match text.strip_prefix("err:") {
                    Some(rest) => console.print_err(&format!("{rest}\n")),
                    None => console.println(&format!("echo: {text}")),
                }
            }
        }
        Ok(None)
    }
}

struct MainOnly;

impl Program for MainOnly {
    fn exports(&self) -> &'static [&'static str] {
        &[]
    }

    fn has_main(&self) -> bool {
        true
    }

    fn call(&mut self, console: &mut dyn Console, _name: &str, _args: &[UnitValue]) -> CallResult {
        console.println("main ran");
        Ok(Some(UnitValue::Number(0.0)))
    }
}

struct Bare;

impl Program for Bare {
    fn exports(&self) -> &'static [&'static str] {
        &[]
    }

    fn call(&mut self, _console: &mut dyn Console, name: &str, _args: &[UnitValue]) -> CallResult {
        Err(format!("no such function: {name}"))
    }
}

struct Raise;

impl Program for Raise {
    fn exports(&self) -> &'static [&'static str] {
        &["init_raise", "process_raise_input"]
    }

    fn call(&mut self, console: &mut dyn Console, name: &str, _args: &[UnitValue]) -> CallResult {
        console.println(&format!("{name} about to fail"));
        Err("boom".to_string())
    }
}
