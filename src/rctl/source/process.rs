// process: Enumerates the running processes.
#![forbid(unsafe_code)]
use super::Enumerate;
use crate::rctl::errors::RctlError;
use crate::rctl::resource::Identity;
use sysinfo::{
    ProcessRefreshKind,
    ProcessesToUpdate,
    System,
    UpdateKind,
};
use tracing::debug;

/// Walks the process table.
#[derive(Debug, Default)]
pub struct ProcessTable;

impl ProcessTable {
    pub fn new() -> Self {
        Self
    }
}

impl Enumerate for ProcessTable {
    fn candidates(&self) -> Result<Vec<Identity>, RctlError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(RctlError::SourceUnavailable {
                name:   "process table",
                reason: "not supported on this system".into(),
            });
        }

        // A fresh System every time, we keep nothing between refreshes.
        let mut system = System::new();
        let refresh_kind = ProcessRefreshKind::nothing()
            .with_cmd(UpdateKind::Always)
            .with_exe(UpdateKind::Always);

        system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            refresh_kind,
        );

        let mut processes: Vec<Identity> = system
            .processes()
            .iter()
            // Threads show up as processes on some platforms
            .filter(|(_, process)| process.thread_kind().is_none())
            .map(|(pid, process)| {
                let cmdline = process.cmd()
                    .iter()
                    .map(|arg| arg.to_string_lossy())
                    .collect::<Vec<_>>()
                    .join(" ");

                let exe = process.exe()
                    .map(|exe| exe.display().to_string())
                    .unwrap_or_default();

                Identity::Process {
                    pid:  pid.as_u32(),
                    ppid: process.parent().map(|ppid| ppid.as_u32()),
                    exe,
                    cmdline,
                }
            })
            .collect();

        if processes.is_empty() {
            return Err(RctlError::SourceUnavailable {
                name:   "process table",
                reason: "no processes found".into(),
            });
        }

        processes.sort_by_key(|process| match process {
            Identity::Process { pid, .. } => *pid,
            _                             => 0,
        });

        debug!("Found {} processes", processes.len());

        Ok(processes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Whatever platform we're on, we're a process with our own pid.
    #[test]
    fn candidates_include_ourselves() {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return;
        }

        let pid = std::process::id();
        let processes = ProcessTable::new().candidates().unwrap();

        let found = processes.iter().any(|process| {
            matches!(process, Identity::Process { pid: p, .. } if *p == pid)
        });

        assert!(found);
    }

    #[test]
    fn candidates_are_sorted_by_pid() {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return;
        }

        let pids: Vec<u32> = ProcessTable::new()
            .candidates()
            .unwrap()
            .into_iter()
            .filter_map(|process| match process {
                Identity::Process { pid, .. } => Some(pid),
                _                             => None,
            })
            .collect();

        assert!(pids.windows(2).all(|w| w[0] < w[1]));
    }
}
