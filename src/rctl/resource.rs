// resource: Accounting records and the parser for rctl_get_racct output.
#![forbid(unsafe_code)]
use super::subject::Subject;
use tracing::debug;

// Declares the Usage struct along with the table mapping rctl(8) resource
// names onto its fields.
macro_rules! usage_fields {
    ($($key:literal => $field:ident, $doc:literal;)+) => {
        /// Numeric usage figures parsed out of a raw accounting string.
        #[derive(Clone, Debug, Default, PartialEq, Eq)]
        pub struct Usage {
            $(
                #[doc = $doc]
                pub $field: u64,
            )+
        }

        impl Usage {
            // Returns the field that a given resource name populates, or None
            // for resources we don't track.
            fn field_mut(&mut self, key: &str) -> Option<&mut u64> {
                match key {
                    $($key => Some(&mut self.$field),)+
                    _ => None,
                }
            }
        }
    };
}

usage_fields! {
    "cputime"         => cputime,         "CPU time, in seconds";
    "datasize"        => datasize,        "data size, in bytes";
    "stacksize"       => stacksize,       "stack size, in bytes";
    "coredumpsize"    => coredumpsize,    "core dump size, in bytes";
    "memoryuse"       => memoryuse,       "resident set size, in bytes";
    "memorylocked"    => memorylocked,    "locked memory, in bytes";
    "maxproc"         => maxproc,         "number of processes";
    "openfiles"       => openfiles,       "file descriptor table size";
    "vmemoryuse"      => vmemoryuse,      "address space limit, in bytes";
    "pseudoterminals" => pseudoterminals, "number of PTYs";
    "swapuse"         => swapuse,         "swap space that may be reserved or used, in bytes";
    "nthr"            => nthr,            "number of threads";
    "msgqqueued"      => msgqqueued,      "number of queued SysV messages";
    "msgqsize"        => msgqsize,        "SysV message queue size, in bytes";
    "nmsgq"           => nmsgq,           "number of SysV message queues";
    "nsem"            => nsem,            "number of SysV semaphores";
    "nsemop"          => nsemop,          "number of SysV semaphores modified in a single semop(2) call";
    "nshm"            => nshm,            "number of SysV shared memory segments";
    "shmsize"         => shmsize,         "SysV shared memory size, in bytes";
    "wallclock"       => wallclock,       "wallclock time, in seconds";
    "pcpu"            => pcpu,            "%CPU, in percents of a single CPU core";
    "readbps"         => readbps,         "filesystem reads, in bytes per second";
    "writebps"        => writebps,        "filesystem writes, in bytes per second";
    "readiops"        => readiops,        "filesystem reads, in operations per second";
    "writeiops"       => writeiops,       "filesystem writes, in operations per second";
}

impl Usage {
    /// Parses a `key=value,key=value` string as returned by rctl_get_racct.
    ///
    /// Parsing is best effort. Unknown keys are skipped, values that aren't
    /// numbers leave their field at zero, and a segment with no `=` ends the
    /// parse, keeping whatever was gathered before it.
    pub fn parse(raw: &str) -> Self {
        let mut usage = Self::default();

        for segment in raw.split(',') {
            let Some((key, value)) = segment.split_once('=') else {
                debug!("Malformed segment '{segment}', stopping parse");
                break;
            };

            let Some(field) = usage.field_mut(key) else {
                continue;
            };

            match value.parse::<u64>() {
                Ok(value) => *field = value,
                Err(e)    => debug!("Value for {key} not parsable: {e}"),
            }
        }

        usage
    }
}

/// The entity an accounting record belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Identity {
    Process {
        pid:     u32,
        ppid:    Option<u32>,
        exe:     String,
        cmdline: String,
    },
    User {
        uid:  u32,
        name: String,
    },
    Jail {
        jid:  i32,
        name: String,
    },
    LoginClass {
        name: String,
    },
}

impl Identity {
    pub fn subject(&self) -> Subject {
        match self {
            Self::Process { .. }    => Subject::Process,
            Self::User { .. }       => Subject::User,
            Self::Jail { .. }       => Subject::Jail,
            Self::LoginClass { .. } => Subject::LoginClass,
        }
    }

    /// The identifier rctl knows this entity by.
    ///
    /// Jails are queried by name, as jail IDs are reused.
    pub fn rule_id(&self) -> String {
        match self {
            Self::Process { pid, .. }  => pid.to_string(),
            Self::User { uid, .. }     => uid.to_string(),
            Self::Jail { name, .. }    => name.clone(),
            Self::LoginClass { name }  => name.clone(),
        }
    }

    /// The `subject:id:` rule used to query the accounting facility.
    pub fn rule(&self) -> String {
        format!("{}:{}:", self.subject(), self.rule_id())
    }

    /// The name that filter patterns are matched against.
    pub fn match_name(&self) -> &str {
        match self {
            Self::Process { cmdline, .. } => cmdline,
            Self::User { name, .. }       => name,
            Self::Jail { name, .. }       => name,
            Self::LoginClass { name }     => name,
        }
    }
}

/// A single sampled accounting record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resource {
    identity: Identity,
    raw:      String,
    usage:    Usage,
}

impl Resource {
    pub fn new(identity: Identity, raw: String) -> Self {
        let usage = Usage::parse(&raw);

        Self {
            identity,
            raw,
            usage,
        }
    }

    pub fn subject(&self) -> Subject {
        self.identity.subject()
    }

    /// pid, uid, jid or login class name.
    pub fn id(&self) -> String {
        match &self.identity {
            Identity::Jail { jid, .. } => jid.to_string(),
            identity                   => identity.rule_id(),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// The accounting string exactly as the kernel returned it.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn usage(&self) -> &Usage {
        &self.usage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn login_class(name: &str) -> Identity {
        Identity::LoginClass {
            name: name.into(),
        }
    }

    #[test]
    fn parse_known_keys() {
        let raw = "cputime=120,memoryuse=4096,wallclock=600";
        let resource = Resource::new(login_class("daemon"), raw.into());

        let ok = Usage {
            cputime:   120,
            memoryuse: 4096,
            wallclock: 600,
            ..Default::default()
        };

        assert_eq!(resource.usage(), &ok);
        assert_eq!(resource.raw(), raw);
    }

    #[test]
    fn parse_every_field() {
        let raw = "cputime=1,datasize=2,stacksize=3,coredumpsize=4,\
                   memoryuse=5,memorylocked=6,maxproc=7,openfiles=8,\
                   vmemoryuse=9,pseudoterminals=10,swapuse=11,nthr=12,\
                   msgqqueued=13,msgqsize=14,nmsgq=15,nsem=16,nsemop=17,\
                   nshm=18,shmsize=19,wallclock=20,pcpu=21,readbps=22,\
                   writebps=23,readiops=24,writeiops=25";
        let usage = Usage::parse(raw);

        assert_eq!(usage.cputime, 1);
        assert_eq!(usage.coredumpsize, 4);
        assert_eq!(usage.pseudoterminals, 10);
        assert_eq!(usage.nsemop, 17);
        assert_eq!(usage.pcpu, 21);
        assert_eq!(usage.writeiops, 25);
    }

    #[test]
    fn parse_stops_at_malformed_segment() {
        let raw = "cputime=120,badsegment,memoryuse=99";
        let resource = Resource::new(login_class("daemon"), raw.into());

        assert_eq!(resource.usage().cputime, 120);
        assert_eq!(resource.usage().memoryuse, 0);
        assert_eq!(resource.raw(), raw);
    }

    #[test]
    fn parse_ignores_unknown_keys() {
        let usage = Usage::parse("madeupkey=5,cputime=10");

        let ok = Usage {
            cputime: 10,
            ..Default::default()
        };

        assert_eq!(usage, ok);
    }

    #[test]
    fn parse_bad_value_only_zeroes_that_field() {
        let usage = Usage::parse("cputime=abc,nthr=4,memoryuse=-1,openfiles=9");

        assert_eq!(usage.cputime, 0);
        assert_eq!(usage.nthr, 4);
        assert_eq!(usage.memoryuse, 0);
        assert_eq!(usage.openfiles, 9);
    }

    #[test]
    fn parse_splits_on_first_equals() {
        let usage = Usage::parse("cputime=1=2,nthr=3");

        assert_eq!(usage.cputime, 0);
        assert_eq!(usage.nthr, 3);
    }

    #[test]
    fn parse_truncated_tail() {
        // Output cut short at the buffer boundary.
        let usage = Usage::parse("cputime=7,memoryuse=12,wallcl");

        assert_eq!(usage.cputime, 7);
        assert_eq!(usage.memoryuse, 12);
        assert_eq!(usage.wallclock, 0);
    }

    #[test]
    fn parse_empty() {
        assert_eq!(Usage::parse(""), Usage::default());
    }

    #[test]
    fn identity_rules() {
        let process = Identity::Process {
            pid:     713,
            ppid:    Some(1),
            exe:     "/usr/local/sbin/libvirtd".into(),
            cmdline: "/usr/local/sbin/libvirtd --daemon".into(),
        };
        let user = Identity::User {
            uid:  1001,
            name: "yo".into(),
        };
        let jail = Identity::Jail {
            jid:  120,
            name: "dovecot".into(),
        };

        assert_eq!(process.rule(), "process:713:");
        assert_eq!(user.rule(), "user:1001:");
        assert_eq!(jail.rule(), "jail:dovecot:");
        assert_eq!(login_class("daemon").rule(), "loginclass:daemon:");
    }

    #[test]
    fn identity_match_names() {
        let process = Identity::Process {
            pid:     713,
            ppid:    None,
            exe:     "/usr/local/sbin/libvirtd".into(),
            cmdline: "/usr/local/sbin/libvirtd --daemon".into(),
        };

        assert_eq!(process.match_name(), "/usr/local/sbin/libvirtd --daemon");
        assert_eq!(login_class("daemon").match_name(), "daemon");
    }

    #[test]
    fn resource_ids() {
        let jail = Identity::Jail {
            jid:  120,
            name: "dovecot".into(),
        };
        let resource = Resource::new(jail, String::new());

        assert_eq!(resource.subject(), Subject::Jail);
        assert_eq!(resource.id(), "120");

        let resource = Resource::new(login_class("staff"), String::new());
        assert_eq!(resource.id(), "staff");
    }
}
