use anyhow::Result;
use sci_calc::ai::{AiAnalysis, AiResult, AnalysisKind, AnalysisService};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use tracing::debug;

struct AiRequest {
    kind: AnalysisKind,
    text: String,
}

pub struct AiReply {
    pub kind: AnalysisKind,
    pub result: AiResult<AiAnalysis>,
}

/// Runs AI requests on their own thread so the UI loop never awaits them.
pub struct AiWorker {
    requests: Sender<AiRequest>,
    replies: Receiver<AiReply>,
}

impl AiWorker {
    pub fn spawn(service: Box<dyn AnalysisService>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let (request_tx, request_rx) = mpsc::channel::<AiRequest>();
        let (reply_tx, reply_rx) = mpsc::channel();

        thread::Builder::new()
            .name("ai-worker".to_string())
            .spawn(move || {
                while let Ok(request) = request_rx.recv() {
                    debug!("AI request {:?}", request.kind);
                    let result = runtime.block_on(service.request(request.kind, &request.text));
                    let reply = AiReply {
                        kind: request.kind,
                        result,
                    };
                    if reply_tx.send(reply).is_err() {
                        break;
                    }
                }
            })?;

        Ok(AiWorker {
            requests: request_tx,
            replies: reply_rx,
        })
    }

    pub fn submit(&self, kind: AnalysisKind, text: &str) -> bool {
        self.requests
            .send(AiRequest {
                kind,
                text: text.to_string(),
            })
            .is_ok()
    }

    pub fn try_recv(&self) -> Option<AiReply> {
        self.replies.try_recv().ok()
    }
}
