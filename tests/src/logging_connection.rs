use async_trait::async_trait;
use rivet::{Capability, Connection, Response, Result, Value};

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

#[derive(Debug, Clone, PartialEq)]
pub struct ExecOp {
    pub sql: String,
    pub params: Vec<Value>,
}

/// A connection that records every statement instead of running it.
///
/// Responses are replayed from a script in order. Once the script runs out,
/// a `SELECT` gets no rows and anything else reports one affected row.
#[derive(Debug)]
pub struct LoggingConnection {
    capability: &'static Capability,

    /// Log of all statements executed through this connection
    ops_log: Arc<Mutex<Vec<ExecOp>>>,

    script: Arc<Mutex<VecDeque<Result<Response>>>>,
}

impl LoggingConnection {
    pub fn new(capability: &'static Capability) -> Self {
        Self {
            capability,
            ops_log: Arc::new(Mutex::new(Vec::new())),
            script: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    pub fn ops_log_handle(&self) -> Arc<Mutex<Vec<ExecOp>>> {
        self.ops_log.clone()
    }

    pub fn script_handle(&self) -> Arc<Mutex<VecDeque<Result<Response>>>> {
        self.script.clone()
    }
}

#[async_trait]
impl Connection for LoggingConnection {
    fn capability(&self) -> &'static Capability {
        self.capability
    }

    async fn exec(&self, sql: &str, params: &[Value]) -> Result<Response> {
        self.ops_log
            .lock()
            .expect("Failed to acquire ops log lock")
            .push(ExecOp {
                sql: sql.to_string(),
                params: params.to_vec(),
            });

        let scripted = self.script.lock().expect("Failed to acquire script lock").pop_front();

        match scripted {
            Some(response) => response,
            None if sql.starts_with("SELECT") => Ok(Response::values(vec![])),
            None => Ok(Response::count(1)),
        }
    }
}
