//! Kawesome module generator
//!
//! Runs the generation pipeline for one request:
//!
//! ```text
//! Start -> PreconditionChecked -> Merged -> Validated
//!       -> NetworkSynthesized -> SecretSynthesized -> Done
//! ```
//!
//! Any failure moves the run to `Errored` and returns the error; no partial
//! resource list is ever returned. The whole run sits behind a single panic
//! boundary that converts a fault into [`Error::Internal`].

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use kawesome_common::{
    Error, GeneratorRequest, GeneratorResponse, ModuleGenerator, Result, Workload,
};
use tracing::{debug, error, info, instrument, warn};

use crate::config::ModuleConfig;
use crate::random_password::RandomPasswordCompiler;
use crate::service::ServiceCompiler;

/// Name the module is registered under
pub const MODULE_NAME: &str = "kawesome";

/// Pipeline state reached by a generator run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeneratePhase {
    /// Nothing checked yet
    Start,
    /// Workload accepted
    PreconditionChecked,
    /// Module config completed from both sources
    Merged,
    /// Module config validated
    Validated,
    /// Service resource generated
    NetworkSynthesized,
    /// random_password resource and patch generated
    SecretSynthesized,
    /// Response assembled
    Done,
    /// The run failed
    Errored,
}

impl fmt::Display for GeneratePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::PreconditionChecked => "precondition-checked",
            Self::Merged => "merged",
            Self::Validated => "validated",
            Self::NetworkSynthesized => "network-synthesized",
            Self::SecretSynthesized => "secret-synthesized",
            Self::Done => "done",
            Self::Errored => "errored",
        };
        f.write_str(name)
    }
}

/// Generates a Kubernetes Service and a Terraform random_password for a
/// Service workload.
///
/// Stateless: every call builds its own module config, so one instance can
/// serve concurrent requests.
#[derive(Clone, Copy, Debug, Default)]
pub struct KawesomeGenerator;

impl KawesomeGenerator {
    /// Create a generator
    pub fn new() -> Self {
        Self
    }
}

impl ModuleGenerator for KawesomeGenerator {
    fn name(&self) -> &str {
        MODULE_NAME
    }

    #[instrument(
        skip(self, request),
        fields(
            module = MODULE_NAME,
            project = %request.project,
            stack = %request.stack,
            app = %request.app,
        )
    )]
    fn generate(&self, request: &GeneratorRequest) -> Result<GeneratorResponse> {
        info!("generating resources");
        let result = with_fault_boundary(request, |phase| run(request, phase));
        if let Ok(ref response) = result {
            info!(resources = response.resources.len(), "generated resources");
        }
        result
    }
}

// =============================================================================
// Fault boundary
// =============================================================================

thread_local! {
    /// Nesting depth of fault boundaries on this thread
    static BOUNDARY_DEPTH: Cell<usize> = const { Cell::new(0) };
    /// Stack captured by the panic hook for the innermost boundary
    static PANIC_BACKTRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static INSTALL_HOOK: Once = Once::new();

/// Chain a panic hook that records the panicking stack while a boundary is
/// active on the current thread. Panics elsewhere only reach the previous hook.
fn install_backtrace_hook() {
    INSTALL_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if BOUNDARY_DEPTH.try_with(Cell::get).unwrap_or(0) > 0 {
                let backtrace = Backtrace::force_capture().to_string();
                let _ = PANIC_BACKTRACE.try_with(|slot| *slot.borrow_mut() = Some(backtrace));
            }
            previous(info);
        }));
    });
}

/// Run `pipeline`, converting a panic into [`Error::Internal`].
///
/// The pipeline reports progress through the phase cell so a fault can be
/// attributed to the state it happened in. The backtrace is taken at the
/// panic site regardless of `RUST_BACKTRACE`.
pub fn with_fault_boundary<F>(request: &GeneratorRequest, pipeline: F) -> Result<GeneratorResponse>
where
    F: FnOnce(&Cell<GeneratePhase>) -> Result<GeneratorResponse>,
{
    install_backtrace_hook();
    let phase = Cell::new(GeneratePhase::Start);

    PANIC_BACKTRACE.with(|slot| slot.borrow_mut().take());
    BOUNDARY_DEPTH.with(|depth| depth.set(depth.get() + 1));
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| pipeline(&phase)));
    BOUNDARY_DEPTH.with(|depth| depth.set(depth.get() - 1));

    match outcome {
        Ok(Ok(response)) => Ok(response),
        Ok(Err(e)) => {
            let failed_in = phase.replace(GeneratePhase::Errored);
            if e.is_user_error() {
                debug!(
                    error = %e,
                    category = e.category(),
                    phase = %failed_in,
                    "generation rejected"
                );
            } else {
                warn!(error = %e, category = e.category(), phase = %failed_in, "generation failed");
            }
            Err(e)
        }
        Err(payload) => {
            let failed_in = phase.replace(GeneratePhase::Errored);
            let message = panic_message(payload.as_ref());
            // Hook replaced by someone else: fall back to the boundary's own stack
            let backtrace = PANIC_BACKTRACE
                .with(|slot| slot.borrow_mut().take())
                .unwrap_or_else(|| Backtrace::force_capture().to_string());
            error!(panic = %message, phase = %failed_in, "generator panicked, recovered");
            Err(Error::internal(
                failed_in.to_string(),
                message,
                request.snapshot(),
                backtrace,
            ))
        }
    }
}

fn run(request: &GeneratorRequest, phase: &Cell<GeneratePhase>) -> Result<GeneratorResponse> {
    check_workload(request.workload.as_ref())?;
    phase.set(GeneratePhase::PreconditionChecked);

    if request.dev_config.is_none() {
        info!("kawesome module not configured by the developer, using defaults");
    }

    let mut cfg = ModuleConfig::default();
    cfg.complete(request.dev_config.as_ref(), request.platform_config.as_ref())?;
    phase.set(GeneratePhase::Merged);

    cfg.validate()?;
    phase.set(GeneratePhase::Validated);

    let service = ServiceCompiler::generate(request, &cfg)?;
    phase.set(GeneratePhase::NetworkSynthesized);

    let password = RandomPasswordCompiler::generate(request, &cfg)?;
    phase.set(GeneratePhase::SecretSynthesized);

    let response = GeneratorResponse {
        resources: vec![service, password.resource],
        patch: Some(password.patch),
    };
    phase.set(GeneratePhase::Done);
    Ok(response)
}

/// Network resources can only be bound to a Service workload.
fn check_workload(workload: Option<&Workload>) -> Result<()> {
    match workload {
        None => Err(Error::precondition("empty workload")),
        Some(workload) if workload.is_network_exposable() => Ok(()),
        Some(other) => Err(Error::precondition(format!(
            "ports must be bound to a Service workload, got {}",
            other.kind()
        ))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
