use cshowcase::runtime::process::wire::{self, LocateParams, LocateResult, TextParams};
use lsp_server::{Message, RequestId};
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// What a program can do to the outside world while it runs.
pub trait Console {
    fn print(&mut self, text: &str);
    fn print_err(&mut self, text: &str);
    /// Asks the host where an auxiliary file lives.
    fn locate(&mut self, name: &str) -> Option<String>;

    fn println(&mut self, text: &str) {
        self.print(&format!("{text}\n"));
    }
}

pub struct Host<R, W> {
    reader: R,
    writer: W,
    next_id: i32,
    backlog: VecDeque<Message>,
}

impl<R: BufRead, W: Write> Host<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            next_id: 1,
            backlog: VecDeque::new(),
        }
    }

    /// Next host message, including any that arrived while waiting on a reply.
    pub fn next_message(&mut self) -> io::Result<Option<Message>> {
        if let Some(msg) = self.backlog.pop_front() {
            return Ok(Some(msg));
        }
        Message::read(&mut self.reader)
    }

    pub fn send(&mut self, msg: Message) {
        let _ = msg.write(&mut self.writer);
    }

    fn request(&mut self, method: &str, params: impl serde::Serialize) -> Option<serde_json::Value> {
        let id = RequestId::from(self.next_id);
        self.next_id += 1;
        self.send(Message::Request(wire::request(id.clone(), method, params)));

        loop {
            match Message::read(&mut self.reader) {
                Ok(Some(Message::Response(resp))) if resp.id == id => {
                    return resp.result;
                }
                Ok(Some(other)) => self.backlog.push_back(other),
                Ok(None) | Err(_) => return None,
            }
        }
    }
}

impl<R: BufRead, W: Write> Console for Host<R, W> {
    fn print(&mut self, text: &str) {
        let params = TextParams {
            text: text.to_string(),
        };
        self.send(wire::notification(wire::METHOD_PRINT, params));
    }

    fn print_err(&mut self, text: &str) {
        let params = TextParams {
            text: text.to_string(),
        };
        self.send(wire::notification(wire::METHOD_PRINT_ERR, params));
    }

    fn locate(&mut self, name: &str) -> Option<String> {
        let params = LocateParams {
            name: name.to_string(),
        };
        let result = self.request(wire::METHOD_LOCATE, params)?;
        serde_json::from_value::<LocateResult>(result)
            .ok()
            .map(|r| r.path)
    }
}
