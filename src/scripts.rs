//! Documentation about the various scripts contained herein
//!
//! - [check-snmp-disk](#check-snmp-disk)
//! - [metrics-couchbase](#metrics-couchbase)
//!
//! # check-snmp-disk
//!
//! Cross platform, only requires UDP access to an SNMP agent that serves HOST-RESOURCES-MIB.
//!
//! ```plain
//! $ check-snmp-disk --help
//! check-snmp-disk (part of remote-check-plugins) 0.1.0
//! Check disk usage on a remote host over SNMP
//!
//! Walks the hrStorage table of the agent, picks every storage area whose description matches the mount point pattern,
//! and compares how full it is against the thresholds.
//!
//! USAGE:
//!     check-snmp-disk [OPTIONS]
//!
//! FLAGS:
//!         --help       Prints help information
//!     -V, --version    Prints version information
//!
//! OPTIONS:
//!     -C, --community <community>          SNMP community [default: public]
//!     -c, --critical <critical>            Percent used to go critical at [default: 90]
//!     -h, --host <host>                    SNMP agent to query [default: 127.0.0.1]
//!     -i, --ignore-mnt <ignore-mnt>        Ignore mount point(s), e.g. /boot,/run
//!     -m, --mount-point <mount-point>      Regex matched against device descriptions [default: /]
//!     -v, --snmp-version <snmp-version>    SNMP version to use (SNMPv1, SNMPv2c) [default: SNMPv2c]
//!     -t, --timeout <timeout>              Request timeout in seconds [default: 1]
//!     -w, --warning <warning>              Percent used to warn at [default: 80]
//!
//! About Mount Points:
//!
//!     The mount point is a regular expression matched anywhere in the device
//!     description, so `-m /` matches every mounted file system. To match one
//!     device exactly, add a comma to the pattern:
//!
//!         check-snmp-disk -h host -C public -m /,
//!
//!     To list the device descriptions your agent reports, run:
//!
//!         snmpwalk -v2c -c public host 1.3.6.1.2.1.25.2.3.1.3
//! ```
//!
//! # metrics-couchbase
//!
//! Cross platform, only requires HTTP access to the Couchbase REST API. Prints Graphite plaintext.
//!
//! ```plain
//! $ metrics-couchbase --help
//! metrics-couchbase (part of remote-check-plugins) 0.1.0
//! Collect node statistics from the Couchbase REST API
//!
//! Prints the `interestingStats` of every matching cluster node as Graphite plaintext: `<scheme>.<node hostname>.<stat>
//! <value> <timestamp>`.
//!
//! USAGE:
//!     metrics-couchbase [OPTIONS]
//!
//! FLAGS:
//!     -h, --help       Prints help information
//!     -V, --version    Prints version information
//!
//! OPTIONS:
//!     -a, --api <api>              Couchbase Admin Rest API base URL [default: http://localhost:8091]
//!         --hostname <hostname>    Only report nodes whose hostname contains this. Default: this host's name
//!     -P, --password <password>    Couchbase Admin Rest API auth password
//!         --scheme <scheme>        Metric naming scheme, text to prepend to $hostname.$metric. Default: <this host's
//!                                  name>.couchbase
//!         --timeout <timeout>      HTTP timeout in seconds [default: 10]
//!     -u, --user <user>            Couchbase Admin Rest API auth username
//! ```
