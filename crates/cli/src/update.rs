//! `permsync update` — write ACL changes to the catalog.

use std::path::PathBuf;

use clap::Subcommand;

use permsync_engine::policy::default_acl;
use permsync_engine::sync::{rollup_to_folder, update_acl, update_space_acl, SyncOutcome};
use permsync_engine::walker::{enumerate_all, enumerate_leaves};

use crate::{connect, load_policy, progress, resolve_base, CliError, ConnectionArgs};

#[derive(Subcommand)]
pub enum UpdateCommands {
    /// Reconcile a source or folder subtree against the policy
    #[command(after_help = "\
Examples:
  permsync update acl postgres -a policy.json
  permsync update acl postgres sales -a policy.json -u svc_etl
  permsync update acl postgres -a policy.json --source-only")]
    Acl {
        /// Base path segments of the subtree
        #[arg(required = true)]
        base: Vec<String>,

        /// Policy JSON file
        #[arg(long, short = 'a')]
        acl_file: PathBuf,

        /// Group granted READ/WRITE when an ACL would end up empty
        #[arg(long, short = 'g')]
        group_on_acl_empty: Option<String>,

        /// User granted READ/WRITE when an ACL would end up empty
        #[arg(long, short = 'u')]
        user_on_acl_empty: Option<String>,

        /// Only reconcile the base containers, skip datasets
        #[arg(long, short = 's')]
        source_only: bool,
    },

    /// Reconcile a space and everything under it against the policy
    #[command(name = "space-acl", after_help = "\
Examples:
  permsync update space-acl analytics -a policy.json
  permsync update space-acl analytics -a policy.json -g analysts")]
    SpaceAcl {
        /// Space name (or path of a folder inside one)
        #[arg(required = true)]
        base: Vec<String>,

        /// Policy JSON file
        #[arg(long, short = 'a')]
        acl_file: PathBuf,

        /// Group granted READ/WRITE when an ACL would end up empty
        #[arg(long, short = 'g')]
        group_on_acl_empty: Option<String>,

        /// User granted READ/WRITE when an ACL would end up empty
        #[arg(long, short = 'u')]
        user_on_acl_empty: Option<String>,
    },

    /// Aggregate dataset ACLs into a superset on their folder
    #[command(name = "acls-to-folder", after_help = "\
Examples:
  permsync update acls-to-folder postgres sales
  permsync update acls-to-folder postgres sales --delete-pds-acls")]
    AclsToFolder {
        /// Base path segments of the folder
        #[arg(required = true)]
        base: Vec<String>,

        /// Group granted READ/WRITE when no dataset carries an ACL
        #[arg(long, short = 'g')]
        group_on_acl_empty: Option<String>,

        /// User granted READ/WRITE when no dataset carries an ACL
        #[arg(long, short = 'u')]
        user_on_acl_empty: Option<String>,

        /// Blank the dataset ACLs once the folder assignment succeeds
        #[arg(long, short = 'd')]
        delete_pds_acls: bool,
    },
}

pub fn run(cmd: UpdateCommands, connection: &ConnectionArgs, quiet: bool) -> Result<(), CliError> {
    match cmd {
        UpdateCommands::Acl {
            base,
            acl_file,
            group_on_acl_empty,
            user_on_acl_empty,
            source_only,
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
            let outcome = update_acl(
                &client,
                &policy,
                &root,
                &walk.paths,
                source_only,
                &default,
                &mut out,
            );
            finish(outcome)
        }

        UpdateCommands::SpaceAcl { base, acl_file, group_on_acl_empty, user_on_acl_empty } => {
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
            let walk = enumerate_all(&client, &root, true, &mut out);
            let outcome = update_space_acl(&client, &policy, &walk.paths, &default, &mut out);
            finish(outcome)
        }

        UpdateCommands::AclsToFolder {
            base,
            group_on_acl_empty,
            user_on_acl_empty,
            delete_pds_acls,
        } => {
            let default =
                default_acl(user_on_acl_empty.as_deref(), group_on_acl_empty.as_deref());
            let client = connect(connection)?;
            let mut out = progress(quiet);
            let folder = resolve_base(&client, &base)?;
            if !folder.entity_type.is_container() {
                return Err(CliError::usage(format!(
                    "{} is not a container",
                    folder.display_path()
                )));
            }
            let walk = enumerate_leaves(&client, &folder, &mut out);
            let outcome = rollup_to_folder(
                &client,
                &walk.paths,
                &folder,
                &default,
                delete_pds_acls,
                &mut out,
            );
            finish(outcome)
        }
    }
}

fn finish(outcome: SyncOutcome) -> Result<(), CliError> {
    if outcome.is_clean() {
        Ok(())
    } else {
        Err(CliError::commit_failed(&outcome.failed_paths()))
    }
}
