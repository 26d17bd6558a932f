//! `permsync report` — list pending ACL changes without writing any.

use std::path::PathBuf;

use clap::Subcommand;

use permsync_engine::policy::default_acl;
use permsync_engine::report::report_acl;
use permsync_engine::walker::enumerate_leaves;

use crate::output::write_ndjson;
use crate::{connect, load_policy, progress, resolve_base, CliError, ConnectionArgs};

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Report datasets whose ACLs differ from the policy
    #[command(after_help = "\
Examples:
  permsync report acl postgres -a policy.json -r ./reports
  permsync report acl postgres sales -a policy.json -r ./reports -u svc_etl")]
    Acl {
        /// Base path segments of the subtree
        #[arg(required = true)]
        base: Vec<String>,

        /// Policy JSON file
        #[arg(long, short = 'a')]
        acl_file: PathBuf,

        /// Directory the report file is written into
        #[arg(long, short = 'r')]
        report_path: PathBuf,

        /// Group granted READ/WRITE when an ACL would end up empty
        #[arg(long, short = 'g')]
        group_on_acl_empty: Option<String>,

        /// User granted READ/WRITE when an ACL would end up empty
        #[arg(long, short = 'u')]
        user_on_acl_empty: Option<String>,
    },
}

pub fn run(cmd: ReportCommands, connection: &ConnectionArgs, quiet: bool) -> Result<(), CliError> {
    match cmd {
        ReportCommands::Acl {
            base,
            acl_file,
            report_path,
            group_on_acl_empty,
            user_on_acl_empty,
        } => {
            let policy = load_policy(&acl_file)?;
            let default =
                default_acl(user_on_acl_empty.as_deref(), group_on_acl_empty.as_deref());
            let client = connect(connection)?;
            let mut out = progress(quiet);
            let root = resolve_base(&client, &base)?;
            if !root.entity_type.is_container() {
                return Err(CliError::usage(format!(
                    "{} is not a container",
                    root.display_path()
                )));
            }
            let walk = enumerate_leaves(&client, &root, &mut out);
            let rows = report_acl(&client, &policy, &walk.paths, &default, &mut out);
            let pending = rows.iter().filter(|r| !r.id.is_empty()).count();
            let path = write_ndjson("acl_report", &base, &report_path, &rows)?;
            println!("{pending} datasets need ACL updates, report written to {}", path.display());
            Ok(())
        }
    }
}
