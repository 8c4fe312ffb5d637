use crate::host::Console;
use crate::programs::{CallResult, Program};
use cshowcase::kernel::UnitValue;
use std::time::Duration;

const DEFAULT_DELAY_MS: u64 = 1000;
const BARS_PER_SONG: usize = 4;

struct Song {
    artist: &'static str,
    title: &'static str,
    album: &'static str,
}

const SONGS: [Song; 5] = [
    Song {
        artist: "Kanye West",
        title: "Street Lights",
        album: "808s & Heartbreak",
    },
    Song {
        artist: "Kanye West",
        title: "Ghost Town",
        album: "ye",
    },
    Song {
        artist: "MIKE",
        title: "U think Maybe?",
        album: "Burning Desire",
    },
    Song {
        artist: "Drake",
        title: "Passionfruit",
        album: "More Life",
    },
    Song {
        artist: "Tyler, the Creator",
        title: "ARE WE STILL FRIENDS",
        album: "IGOR",
    },
];

pub struct Jukebox {
    delay: Duration,
    stopped: bool,
}

impl Jukebox {
    pub fn from_env() -> Self {
        let ms = std::env::var("CSHOWCASE_UNIT_DELAY_MS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_DELAY_MS);
        Self {
            delay: Duration::from_millis(ms),
            stopped: false,
        }
    }

    fn menu(&self, console: &mut dyn Console) {
        console.println(&format!(
            "{:<3}{:<32}{:<32}{:<30}",
            " ", "Artist", "Song", "Album"
        ));
        console.println(&"-".repeat(81));
        for (i, song) in SONGS.iter().enumerate() {
            console.println(&format!(
                "{}: {:<30}- {:<30}- {:<30}",
                i + 1,
                song.artist,
                song.title,
                song.album
            ));
        }
        console.println("");
        console.println("0: Quit");
        console.println("");
        console.println(":> ");
    }

    fn play(&self, console: &mut dyn Console, song: &Song) {
        console.println("");
        console.println(&format!(
            "Playing: {} - {} - {}",
            song.artist, song.title, song.album
        ));
        console.println("");
        for bar in 1..=BARS_PER_SONG {
            console.println(&format!("~ {} ({bar}/{BARS_PER_SONG}) ~", song.title));
            if bar < BARS_PER_SONG {
                std::thread::sleep(self.delay);
            }
        }
        console.println("");
    }
}

impl Program for Jukebox {
    fn exports(&self) -> &'static [&'static str] {
        &["process_jukebox_input"]
    }

    fn has_main(&self) -> bool {
        true
    }

    fn call(&mut self, console: &mut dyn Console, name: &str, args: &[UnitValue]) -> CallResult {
        if name == "main" {
            self.stopped = false;
            console.println("Welcome to Steven's Lyric Jukebox!");
            console.println("Please select a track from the list below:");
            console.println("");
            self.menu(console);
            return Ok(Some(UnitValue::Number(0.0)));
        }

        if self.stopped {
            console.println("The jukebox has stopped. Start it again to pick a track.");
            return Ok(None);
        }

        let choice = crate::text_arg(args).trim().parse::<usize>().unwrap_or(usize::MAX);
        match choice {
            0 => {
                console.println("Exiting...");
                self.stopped = true;
            }
            n if (1..=SONGS.len()).contains(&n) => {
                self.play(console, &SONGS[n - 1]);
                self.menu(console);
            }
            _ => {
                console.println("Invalid choice. Please select a valid track number.");
                self.menu(console);
            }
        }
        Ok(None)
    }
}
