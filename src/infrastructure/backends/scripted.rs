use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use anyhow::anyhow;
use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use futures::stream;

use crate::domain::models::Backend;
use crate::domain::models::FragmentStream;
use crate::domain::models::SessionHandle;
use crate::domain::models::SessionSeed;

/// One scripted response. `Err` items end the stream with that error.
pub enum Reply {
    Fragments(Vec<Result<&'static str, &'static str>>),
    Refuse(&'static str),
}

/// In process backend replaying scripted replies, recording every seed and
/// input it receives.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    session_error: Arc<Mutex<Option<&'static str>>>,
    replies: Arc<Mutex<VecDeque<Reply>>>,
    seeds: Arc<Mutex<Vec<SessionSeed>>>,
    inputs: Arc<Mutex<Vec<String>>>,
}

impl ScriptedBackend {
    pub fn with_reply(self, reply: Reply) -> ScriptedBackend {
        self.replies.lock().unwrap().push_back(reply);
        return self;
    }

    pub fn with_fragments(self, fragments: &[&'static str]) -> ScriptedBackend {
        let items = fragments.iter().map(|e| return Ok(*e)).collect();
        return self.with_reply(Reply::Fragments(items));
    }

    pub fn refusing_sessions(self, err: &'static str) -> ScriptedBackend {
        *self.session_error.lock().unwrap() = Some(err);
        return self;
    }

    pub fn accepting_sessions(&self) {
        *self.session_error.lock().unwrap() = None;
    }

    pub fn inputs(&self) -> Vec<String> {
        return self.inputs.lock().unwrap().clone();
    }

    pub fn seeds(&self) -> Vec<SessionSeed> {
        return self.seeds.lock().unwrap().clone();
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn create_session(&self, seed: SessionSeed) -> Result<SessionHandle> {
        self.seeds.lock().unwrap().push(seed.clone());
        if let Some(err) = *self.session_error.lock().unwrap() {
            bail!(err);
        }

        return Ok(SessionHandle::new(seed));
    }

    #[allow(clippy::implicit_return)]
    async fn send_message(&self, handle: &SessionHandle, text: &str) -> Result<FragmentStream> {
        self.inputs.lock().unwrap().push(text.to_string());

        let items = match self.replies.lock().unwrap().pop_front() {
            Some(Reply::Fragments(items)) => items,
            Some(Reply::Refuse(err)) => bail!(err),
            None => bail!("no scripted reply left"),
        };

        let state = (
            items.into_iter(),
            handle.clone(),
            text.to_string(),
            String::new(),
        );
        let fragments = stream::unfold(
            state,
            |(mut items, handle, input, mut reply)| async move {
                match items.next() {
                    Some(Ok(fragment)) => {
                        reply.push_str(fragment);
                        return Some((Ok(fragment.to_string()), (items, handle, input, reply)));
                    }
                    Some(Err(err)) => {
                        return Some((Err(anyhow!(err)), (items, handle, input, reply)));
                    }
                    None => {
                        handle.commit(&input, &reply);
                        return None;
                    }
                }
            },
        );

        return Ok(Box::pin(fragments));
    }
}
