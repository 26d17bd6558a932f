//! `permsync dump` — write current ACLs to an NDJSON file.

use std::path::PathBuf;

use clap::Subcommand;

use permsync_engine::report::{dump_acl, dump_object_acls};
use permsync_engine::walker::{enumerate_all, enumerate_leaves, enumerate_spaces};

use crate::output::write_ndjson;
use crate::{connect, progress, resolve_base, CliError, ConnectionArgs};

#[derive(Subcommand)]
pub enum DumpCommands {
    /// Dump the ACL of every dataset under a base path
    #[command(after_help = "\
Examples:
  permsync dump acl postgres -d ./dumps
  permsync dump acl postgres sales -d ./dumps")]
    Acl {
        /// Base path segments of the subtree
        #[arg(required = true)]
        base: Vec<String>,

        /// Directory the dump file is written into
        #[arg(long, short = 'd')]
        dump_path: PathBuf,
    },

    /// Dump space, folder and dataset ACLs (all spaces when no base given)
    #[command(name = "space-acl", after_help = "\
Examples:
  permsync dump space-acl -d ./dumps
  permsync dump space-acl analytics -d ./dumps --include-vds")]
    SpaceAcl {
        /// Space name (omit to dump every space)
        base: Vec<String>,

        /// Directory the dump file is written into
        #[arg(long, short = 'd')]
        dump_path: PathBuf,

        /// Include virtual datasets in the dump
        #[arg(long, short = 'v')]
        include_vds: bool,
    },
}

pub fn run(cmd: DumpCommands, connection: &ConnectionArgs, quiet: bool) -> Result<(), CliError> {
    match cmd {
        DumpCommands::Acl { base, dump_path } => {
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
            let rows = dump_acl(&client, &walk.paths, &mut out);
            let path = write_ndjson("acl_dump", &base, &dump_path, &rows)?;
            println!("{} ACLs dumped to {}", rows.len(), path.display());
            Ok(())
        }

        DumpCommands::SpaceAcl { base, dump_path, include_vds } => {
            let client = connect(connection)?;
            let mut out = progress(quiet);
            let walk = if base.is_empty() {
                enumerate_spaces(&client, include_vds, &mut out).map_err(CliError::catalog)?
            } else {
                let root = resolve_base(&client, &base)?;
                if !root.entity_type.is_container() {
                    return Err(CliError::usage(format!(
                        "{} is not a container",
                        root.display_path()
                    )));
                }
                enumerate_all(&client, &root, include_vds, &mut out)
            };
            let rows = dump_object_acls(&client, &walk.paths, &mut out);
            let path = write_ndjson("space_acl_dump", &base, &dump_path, &rows)?;
            println!("{} ACLs dumped to {}", rows.len(), path.display());
            Ok(())
        }
    }
}
