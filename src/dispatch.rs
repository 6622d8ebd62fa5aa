// Command dispatch: turns one parsed invocation into at most one key write
// and at most one relay request.
//
// The order of checks matters:
//   1. `-k` saves the key and uses it; otherwise the stored key is loaded.
//   2. No key at all is fatal.
//   3. No positionals: fine right after saving a key, an error otherwise.
//   4. First positional names an existing path: upload it, the second
//      positional (or stdin for `-`) becomes the caption.
//   5. Anything else is sent as text (stdin for `-`).
//
// A mistyped file path therefore goes out as text. That is deliberate
// compatibility with the existing tool.

use std::io::Read;
use std::path::Path;

use crate::api::{MediaPost, Relay, RelayResponse, TextPost};
use crate::cli::Cli;
use crate::error::{Result, TeleputError};
use crate::key_store::KeyStore;
use crate::mime::MimeClassifier;

/// Positional value meaning "read the text from standard input".
pub const STDIN_MARKER: &str = "-";

/// What a successful invocation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Only a new key was given; it has been stored.
    KeySaved,
    TextSent,
    FileSent,
}

pub struct Dispatcher<R> {
    store: KeyStore,
    classifier: Box<dyn MimeClassifier>,
    relay: R,
}

impl<R: Relay> Dispatcher<R> {
    pub fn new(store: KeyStore, classifier: Box<dyn MimeClassifier>, relay: R) -> Self {
        Dispatcher {
            store,
            classifier,
            relay,
        }
    }

    pub fn relay(&self) -> &R {
        &self.relay
    }

    pub fn run(&self, cli: &Cli, stdin: &mut dyn Read) -> Result<Outcome> {
        let new_key = cli.new_key();
        let key = match new_key {
            Some(key) => {
                self.store.save(key)?;
                Some(key.to_string())
            }
            None => {
                log::debug!("reading key from {}", self.store.path().display());
                self.store.load()?
            }
        };
        let key = key.ok_or(TeleputError::MissingCredential)?;

        let Some(first) = cli.what.first() else {
            return if new_key.is_some() {
                Ok(Outcome::KeySaved)
            } else {
                Err(TeleputError::NothingToSend)
            };
        };

        let path = Path::new(first);
        if path.exists() {
            log::debug!("{} exists, uploading it", first);
            let text = cli
                .what
                .get(1)
                .map(|arg| text_or_stdin(arg, stdin))
                .transpose()?;
            let post = self.media_post(key, text, cli.raw, path);
            let res = self.relay.upload(&post)?;
            check(res, false)?;
            Ok(Outcome::FileSent)
        } else {
            log::debug!("{} is not a file, sending it as text", first);
            if cli.what.len() > 1 {
                log::warn!("ignoring extra argument {:?} for a text message", cli.what[1]);
            }
            let post = TextPost {
                key,
                text: text_or_stdin(first, stdin)?,
            };
            let res = self.relay.post_text(&post)?;
            check(res, true)?;
            Ok(Outcome::TextSent)
        }
    }

    fn media_post(&self, key: String, text: Option<String>, raw: bool, path: &Path) -> MediaPost {
        let mime_type = self.classifier.classify(path);
        log::debug!(
            "{} classifier: {} -> {:?}",
            self.classifier.name(),
            path.display(),
            mime_type
        );
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        MediaPost {
            key,
            text,
            raw,
            file_path: path.to_path_buf(),
            file_name,
            mime_type,
        }
    }
}

fn text_or_stdin(arg: &str, stdin: &mut dyn Read) -> Result<String> {
    if arg != STDIN_MARKER {
        return Ok(arg.to_string());
    }
    let mut text = String::new();
    stdin.read_to_string(&mut text)?;
    Ok(text)
}

fn check(res: RelayResponse, with_status: bool) -> Result<()> {
    if res.is_ok() {
        return Ok(());
    }
    Err(TeleputError::ServerRejected {
        status: with_status.then_some(res.status),
        body: res.body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mime::ExtensionClassifier;
    use clap::Parser;
    use std::cell::{Cell, RefCell};
    use std::fs;
    use std::io::{self, Cursor};
    use tempfile::TempDir;

    /// Records every request and answers with a fixed response.
    struct FakeRelay {
        status: u16,
        body: String,
        texts: RefCell<Vec<TextPost>>,
        uploads: RefCell<Vec<MediaPost>>,
    }

    impl FakeRelay {
        fn answering(status: u16, body: &str) -> Self {
            FakeRelay {
                status,
                body: body.to_string(),
                texts: RefCell::new(Vec::new()),
                uploads: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.texts.borrow().len() + self.uploads.borrow().len()
        }

        fn response(&self) -> RelayResponse {
            RelayResponse {
                status: self.status,
                body: self.body.clone(),
            }
        }
    }

    impl Relay for FakeRelay {
        fn post_text(&self, post: &TextPost) -> Result<RelayResponse> {
            self.texts.borrow_mut().push(post.clone());
            Ok(self.response())
        }

        fn upload(&self, post: &MediaPost) -> Result<RelayResponse> {
            self.uploads.borrow_mut().push(post.clone());
            Ok(self.response())
        }
    }

    /// Stdin that remembers whether anything tried to read it.
    struct UnreadStdin(Cell<bool>);

    impl Read for UnreadStdin {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            self.0.set(true);
            Ok(0)
        }
    }

    struct Env {
        temp: TempDir,
        dispatcher: Dispatcher<FakeRelay>,
    }

    impl Env {
        fn new(stored_key: Option<&str>, relay: FakeRelay) -> Self {
            let temp = TempDir::new().unwrap();
            let store = KeyStore::new(temp.path().join("config"));
            if let Some(key) = stored_key {
                store.save(key).unwrap();
            }
            let dispatcher = Dispatcher::new(store, Box::new(ExtensionClassifier), relay);
            Env { temp, dispatcher }
        }

        fn ok(stored_key: Option<&str>) -> Self {
            Self::new(stored_key, FakeRelay::answering(200, "OK"))
        }

        fn run(&self, args: &[&str]) -> Result<Outcome> {
            self.run_with_stdin(args, "")
        }

        fn run_with_stdin(&self, args: &[&str], stdin: &str) -> Result<Outcome> {
            let cli = Cli::parse_from(std::iter::once("teleput").chain(args.iter().copied()));
            self.dispatcher.run(&cli, &mut Cursor::new(stdin.as_bytes().to_vec()))
        }

        fn relay(&self) -> &FakeRelay {
            self.dispatcher.relay()
        }

        fn stored_key(&self) -> Option<String> {
            KeyStore::new(self.temp.path().join("config")).load().unwrap()
        }

        fn file(&self, name: &str) -> String {
            let path = self.temp.path().join(name);
            fs::write(&path, b"payload").unwrap();
            path.to_string_lossy().into_owned()
        }
    }

    #[test]
    fn missing_credential_is_fatal_before_any_request() {
        let env = Env::ok(None);
        let err = env.run(&["hello"]).unwrap_err();
        assert!(matches!(err, TeleputError::MissingCredential));
        assert_eq!(err.exit_code(), 3);
        assert_eq!(env.relay().calls(), 0);
    }

    #[test]
    fn key_only_saves_and_succeeds() {
        let env = Env::ok(None);
        assert_eq!(env.run(&["-k", "TOKEN"]).unwrap(), Outcome::KeySaved);
        assert_eq!(env.stored_key().as_deref(), Some("TOKEN"));
        assert_eq!(env.relay().calls(), 0);
    }

    #[test]
    fn new_key_replaces_stored_one_and_is_used() {
        let env = Env::ok(Some("OLD"));
        env.run(&["-k", "NEW", "hi"]).unwrap();
        assert_eq!(env.stored_key().as_deref(), Some("NEW"));
        assert_eq!(env.relay().texts.borrow()[0].key, "NEW");
    }

    #[test]
    fn nothing_to_send_without_new_key() {
        let env = Env::ok(Some("TOKEN"));
        let err = env.run(&[]).unwrap_err();
        assert!(matches!(err, TeleputError::NothingToSend));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn text_is_posted_with_stored_key() {
        let env = Env::ok(Some("TOKEN"));
        assert_eq!(env.run(&["hello world"]).unwrap(), Outcome::TextSent);
        assert_eq!(
            *env.relay().texts.borrow(),
            vec![TextPost {
                key: "TOKEN".into(),
                text: "hello world".into()
            }]
        );
        assert!(env.relay().uploads.borrow().is_empty());
    }

    #[test]
    fn text_rejection_reports_status() {
        let env = Env::new(Some("TOKEN"), FakeRelay::answering(500, "boom"));
        let err = env.run(&["hello world"]).unwrap_err();
        assert_eq!(err.to_string(), "Error 500: boom");
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn dash_reads_text_from_stdin() {
        let env = Env::ok(Some("TOKEN"));
        env.run_with_stdin(&["-"], "abc").unwrap();
        assert_eq!(env.relay().texts.borrow()[0].text, "abc");
    }

    #[test]
    fn stdin_content_does_not_affect_classification() {
        let env = Env::ok(Some("TOKEN"));
        let existing = env.file("real.png");
        env.run_with_stdin(&["-"], &existing).unwrap();
        assert_eq!(env.relay().texts.borrow()[0].text, existing);
        assert!(env.relay().uploads.borrow().is_empty());
    }

    #[test]
    fn missing_path_is_sent_as_text() {
        let env = Env::ok(Some("TOKEN"));
        let missing = env.temp.path().join("nope.png");
        let missing = missing.to_string_lossy().into_owned();
        env.run(&[missing.as_str(), "caption"]).unwrap();
        assert_eq!(env.relay().texts.borrow()[0].text, missing);
        assert!(env.relay().uploads.borrow().is_empty());
    }

    #[test]
    fn existing_file_is_uploaded_with_caption() {
        let env = Env::ok(Some("TOKEN"));
        let file = env.file("file.png");
        assert_eq!(env.run(&[file.as_str(), "caption"]).unwrap(), Outcome::FileSent);

        let uploads = env.relay().uploads.borrow();
        assert_eq!(uploads.len(), 1);
        let post = &uploads[0];
        assert_eq!(post.key, "TOKEN");
        assert_eq!(post.text.as_deref(), Some("caption"));
        assert!(!post.raw);
        assert_eq!(post.file_name, "file.png");
        assert_eq!(post.mime_type.as_deref(), Some("image/png"));
        assert_eq!(post.file_path, Path::new(&file));
    }

    #[test]
    fn upload_without_caption_leaves_stdin_alone() {
        let env = Env::ok(Some("TOKEN"));
        let file = env.file("notes.txt");
        let cli = Cli::parse_from(["teleput", "--raw", file.as_str()]);
        let mut stdin = UnreadStdin(Cell::new(false));
        env.dispatcher.run(&cli, &mut stdin).unwrap();

        assert!(!stdin.0.get());
        let post = &env.relay().uploads.borrow()[0];
        assert!(post.raw);
        assert_eq!(post.text, None);
        assert_eq!(post.mime_type, None);
    }

    #[test]
    fn upload_caption_from_stdin() {
        let env = Env::ok(Some("TOKEN"));
        let file = env.file("song.mp3");
        env.run_with_stdin(&[file.as_str(), "-"], "piped caption\n").unwrap();
        let post = &env.relay().uploads.borrow()[0];
        assert_eq!(post.text.as_deref(), Some("piped caption\n"));
        assert_eq!(post.mime_type.as_deref(), Some("audio/mpeg"));
    }

    #[test]
    fn upload_rejection_omits_status() {
        let env = Env::new(Some("TOKEN"), FakeRelay::answering(413, "too big"));
        let file = env.file("clip.mp4");
        let err = env.run(&[file.as_str()]).unwrap_err();
        assert_eq!(err.to_string(), "Error: too big");
        assert_eq!(err.exit_code(), 4);
    }
}
