//! In-memory remote host used by the harvester and collector tests

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rtop_core::error::ExecutionError;
use rtop_core::ssh::CommandExecutor;

pub const UPTIME: &str = "350735.47 234388.90\n";
pub const HOSTNAME: &str = "web1.example.com\n";
pub const LOADAVG: &str = "0.10 0.20 0.30 2/150 12345\n";
pub const MEMINFO: &str = "MemTotal:        2048 kB\n\
                           MemFree:          512 kB\n\
                           MemAvailable:    1024 kB\n\
                           Buffers:           64 kB\n\
                           Cached:           128 kB\n\
                           SwapCached:         0 kB\n\
                           SwapTotal:       4096 kB\n\
                           SwapFree:        4000 kB\n";
pub const DF: &str = "Filesystem                        1B-blocks        Used   Available Use% Mounted on\n\
                      /dev/sda1                      105089261568 52544630784 47159013376  53% /\n\
                      /dev/mapper/vg0-very-long-volume-name\n\
                      \x20                              1048576000   104857600   943718400  10% /srv/My Files\n";
pub const IP: &str = "1: lo    inet 127.0.0.1/8 scope host lo\\       valid_lft forever preferred_lft forever\n\
                      1: lo    inet6 ::1/128 scope host \\       valid_lft forever preferred_lft forever\n\
                      2: eth0    inet 10.0.0.2/24 brd 10.0.0.255 scope global eth0\\       valid_lft forever\n\
                      2: eth0    inet6 fe80::1/64 scope link \\       valid_lft forever preferred_lft forever\n\
                      3: wg0    inet 10.8.0.1/24 scope global wg0\\       valid_lft forever\n";
pub const NET_DEV: &str = "Inter-|   Receive                                                |  Transmit\n\
                           \x20face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed\n\
                           \x20   lo:  123456     100    0    0    0     0          0         0   123456     100    0    0    0     0       0          0\n\
                           \x20 eth0: 9876543    5000    0    0    0     0          0         0  1234567    4000    0    0    0     0       0          0\n\
                           docker0:     100       1    0    0    0     0          0         0      200       2    0    0    0     0       0          0\n";
pub const STAT: &str = "cpu  25 0 25 50 0 0 0 0 0 0\n\
                        cpu0 25 0 25 50 0 0 0 0 0 0\n\
                        intr 1234 0 0\n";

/// Every primary probe command with a healthy output
pub const HEALTHY: [(&str, &str); 8] = [
    ("/bin/cat /proc/uptime", UPTIME),
    ("/bin/hostname -f", HOSTNAME),
    ("/bin/cat /proc/loadavg", LOADAVG),
    ("/bin/cat /proc/meminfo", MEMINFO),
    ("/bin/df -B1", DF),
    ("/bin/ip -o addr", IP),
    ("/bin/cat /proc/net/dev", NET_DEV),
    ("/bin/cat /proc/stat", STAT),
];

/// Replays canned command outputs; unknown commands exit with status 127
#[derive(Debug)]
pub struct FakeHost {
    outputs: HashMap<String, String>,
    delay: Duration,
    calls: Mutex<Vec<String>>,
}

impl FakeHost {
    pub fn healthy() -> Self {
        Self {
            outputs: HEALTHY
                .iter()
                .map(|(c, o)| ((*c).to_string(), (*o).to_string()))
                .collect(),
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn without(mut self, command: &str) -> Self {
        self.outputs.remove(command);
        self
    }

    pub fn with(mut self, command: &str, output: &str) -> Self {
        self.outputs.insert(command.to_string(), output.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandExecutor for FakeHost {
    async fn execute(&self, command: &str) -> Result<String, ExecutionError> {
        self.calls.lock().unwrap().push(command.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.outputs
            .get(command)
            .cloned()
            .ok_or_else(|| ExecutionError::ExitStatus {
                command: command.to_string(),
                status: 127,
            })
    }
}
