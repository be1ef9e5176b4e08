//! Command handlers module.
//!
//! One handler type per verb. [`standard_registry`] builds the registry the
//! server runs with; it is called once at startup.

mod auth;
mod files;
mod info;
mod navigate;
mod transfer;

use crate::error::RegistryError;
use crate::error::StorageError;
use crate::error::handlers::storage_reply;
use crate::protocol::commands::CommandResult;
use crate::protocol::parser::parameter;
use crate::protocol::registry::{CommandHandler, CommandRegistry};
use crate::protocol::responses::{PARAMETER_ERROR, format_response};

pub use auth::{CmdPass, CmdQuit, CmdUser};
pub use files::{CmdDele, CmdHash, CmdMdtm, CmdMfmt, CmdMkd, CmdMlst, CmdRang, CmdRmd, CmdRnfr, CmdRnto, CmdSize};
pub use info::{CmdFeat, CmdNoop, CmdOpts, CmdSite, CmdSyst};
pub use navigate::{CmdCdup, CmdCwd, CmdPwd};
pub use transfer::{CmdAppe, CmdList, CmdMlsd, CmdNlst, CmdPasv, CmdPort, CmdRest, CmdRetr, CmdStor, CmdType};

fn boxed<H: CommandHandler + Default + 'static>() -> Box<dyn CommandHandler> {
    Box::new(H::default())
}

/// Builds the registry with every supported verb and synonym.
pub fn standard_registry() -> Result<CommandRegistry, RegistryError> {
    let mut registry = CommandRegistry::new();

    registry.register("SYST", boxed::<CmdSyst>)?;
    registry.register("USER", boxed::<CmdUser>)?;
    registry.register("PASS", boxed::<CmdPass>)?;
    registry.register("TYPE", boxed::<CmdType>)?;
    registry.register("CWD", boxed::<CmdCwd>)?;
    registry.register("PWD", boxed::<CmdPwd>)?;
    registry.register("LIST", boxed::<CmdList>)?;
    registry.register("PASV", boxed::<CmdPasv>)?;
    registry.register("RETR", boxed::<CmdRetr>)?;
    registry.register("NLST", boxed::<CmdNlst>)?;
    registry.register("NOOP", boxed::<CmdNoop>)?;
    registry.register("STOR", boxed::<CmdStor>)?;
    registry.register("DELE", boxed::<CmdDele>)?;
    registry.register("RNFR", boxed::<CmdRnfr>)?;
    registry.register("RNTO", boxed::<CmdRnto>)?;
    registry.register("RMD", boxed::<CmdRmd>)?;
    registry.register("MKD", boxed::<CmdMkd>)?;
    registry.register("OPTS", boxed::<CmdOpts>)?;
    registry.register("PORT", boxed::<CmdPort>)?;
    registry.register("QUIT", boxed::<CmdQuit>)?;
    registry.register("FEAT", boxed::<CmdFeat>)?;
    registry.register("SIZE", boxed::<CmdSize>)?;
    registry.register("CDUP", boxed::<CmdCdup>)?;
    registry.register("APPE", boxed::<CmdAppe>)?;
    registry.register("MDTM", boxed::<CmdMdtm>)?;
    registry.register("MFMT", boxed::<CmdMfmt>)?;
    registry.register("REST", boxed::<CmdRest>)?;
    registry.register("SITE", boxed::<CmdSite>)?;
    registry.register("MLST", boxed::<CmdMlst>)?;
    registry.register("MLSD", boxed::<CmdMlsd>)?;
    registry.register("HASH", boxed::<CmdHash>)?;
    registry.register("RANG", boxed::<CmdRang>)?;

    registry.register_synonym("XCUP", "CDUP")?;
    registry.register_synonym("XPWD", "PWD")?;
    registry.register_synonym("XMKD", "MKD")?;
    registry.register_synonym("XRMD", "RMD")?;

    Ok(registry)
}

/// The parameter of `raw_line`, or a `501` reply when it is empty.
fn required_parameter(raw_line: &str) -> Result<&str, CommandResult> {
    let param = parameter(raw_line);
    if param.trim().is_empty() {
        return Err(CommandResult::failure(
            "Missing parameter",
            format_response(PARAMETER_ERROR, "Syntax error in parameters or arguments"),
        ));
    }
    Ok(param)
}

/// Failure result for a storage error on `client_path`.
fn storage_failure(err: &StorageError, client_path: &str) -> CommandResult {
    CommandResult::failure(err.to_string(), storage_reply(err, client_path))
}
