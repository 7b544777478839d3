//! Unix PTY backend: forks a child process attached to a pseudo terminal
//! and exposes it through the shared [`Session`] abstraction.

use std::convert::TryFrom;
use std::env;
use std::fs::File;
use std::io::{self, Read, Write};
use std::os::fd::{AsRawFd, FromRawFd, IntoRawFd, RawFd};
use std::os::unix::net::UnixStream;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus};

use mio::Token;
use mio::unix::SourceFd;
use nix::libc;
use nix::pty::{Winsize, openpty};
use signal_hook::{
    SigId,
    low_level::{self, pipe},
};

use crate::{PYMUX_PANE, Pollable, PtySize, Session, SessionError};

/// A pane's live connection to a local child process running behind a real
/// pseudo terminal.
pub struct UnixSession {
    master: File,
    child: Child,
    signal_pipe: UnixStream,
    signal_pipe_id: SigId,
}

impl Session for UnixSession {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SessionError> {
        loop {
            match self.master.read(buf) {
                Ok(n) => return Ok(n),
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(SessionError::IO(err)),
            }
        }
    }

    fn write(&mut self, input: &[u8]) -> Result<usize, SessionError> {
        loop {
            match self.master.write(input) {
                Ok(n) => return Ok(n),
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(SessionError::IO(err)),
            }
        }
    }

    fn resize(&mut self, size: PtySize) -> Result<(), SessionError> {
        let size: Winsize = size.into();
        let res = unsafe {
            libc::ioctl(self.master.as_raw_fd(), libc::TIOCSWINSZ, &size as *const _)
        };

        if res < 0 {
            return Err(SessionError::Resize(io::Error::last_os_error()));
        }

        Ok(())
    }

    fn close(&mut self) -> Result<i32, SessionError> {
        low_level::unregister(self.signal_pipe_id);

        if let Some(status) = self.child.try_wait()? {
            return Ok(status.code().unwrap_or_default());
        }

        if let Ok(pid_raw) = i32::try_from(self.child.id()) {
            let result = unsafe { libc::kill(pid_raw, libc::SIGTERM) };
            if result == 0 {
                if let Some(status) = self.child.try_wait()? {
                    return Ok(status.code().unwrap_or_default());
                }
            } else {
                let err = io::Error::last_os_error();
                if err.raw_os_error() != Some(libc::ESRCH) {
                    return Err(SessionError::IO(err));
                }
            }
        }

        match self.child.kill() {
            Ok(()) => (),
            Err(err) if err.kind() == io::ErrorKind::InvalidInput => (),
            Err(err) => return Err(SessionError::IO(err)),
        }

        let status = self.child.wait()?;
        Ok(status.code().unwrap_or_default())
    }

    fn try_get_child_exit_status(&mut self) -> Result<Option<ExitStatus>, SessionError> {
        let mut tmp = [0u8; 1];
        match self.signal_pipe.read(&mut tmp) {
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(SessionError::IO(e)),
            _ => Ok(self.child.try_wait()?),
        }
    }
}

impl Pollable for UnixSession {
    fn register(
        &mut self,
        registry: &mio::Registry,
        interest: mio::Interest,
        io_token: Token,
        child_token: Token,
    ) -> Result<(), SessionError> {
        let master_fd = self.master.as_raw_fd();
        registry.register(&mut SourceFd(&master_fd), io_token, interest)?;

        let signal_fd = self.signal_pipe.as_raw_fd();
        registry.register(&mut SourceFd(&signal_fd), child_token, mio::Interest::READABLE)?;

        Ok(())
    }

    fn reregister(
        &mut self,
        registry: &mio::Registry,
        interest: mio::Interest,
        io_token: Token,
        child_token: Token,
    ) -> Result<(), SessionError> {
        let master_fd = self.master.as_raw_fd();
        registry.reregister(&mut SourceFd(&master_fd), io_token, interest)?;

        let signal_fd = self.signal_pipe.as_raw_fd();
        registry.reregister(&mut SourceFd(&signal_fd), child_token, mio::Interest::READABLE)?;

        Ok(())
    }

    fn deregister(&mut self, registry: &mio::Registry) -> Result<(), SessionError> {
        let master_fd = self.master.as_raw_fd();
        registry.deregister(&mut SourceFd(&master_fd))?;

        let signal_fd = self.signal_pipe.as_raw_fd();
        registry.deregister(&mut SourceFd(&signal_fd))?;

        Ok(())
    }
}

impl Drop for UnixSession {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl UnixSession {
    fn new(master: File, child: Child, signal_pipe: UnixStream, signal_pipe_id: SigId) -> Self {
        Self {
            master,
            child,
            signal_pipe,
            signal_pipe_id,
        }
    }

    /// The pty master's raw descriptor, for hosts that want to drive their
    /// own poll loop instead of the [`Pollable`] integration.
    pub fn as_raw_fd(&self) -> RawFd {
        self.master.as_raw_fd()
    }
}

/// Builder for launching a local command attached to a pseudo terminal.
pub struct UnixSessionBuilder {
    cmd: Command,
    size: PtySize,
    work_dir: Option<PathBuf>,
    pane_id: Option<String>,
    controlling_tty: bool,
}

/// Start building a PTY session for the provided executable.
pub fn unix(program: &str) -> UnixSessionBuilder {
    UnixSessionBuilder {
        cmd: Command::new(program),
        size: PtySize::default(),
        work_dir: None,
        pane_id: None,
        controlling_tty: true,
    }
}

impl UnixSessionBuilder {
    /// Append a single argument to the command line.
    pub fn with_arg(mut self, arg: &str) -> Self {
        self.cmd.arg(arg);
        self
    }

    /// Append a list of arguments to the command line.
    pub fn with_args(mut self, args: &[String]) -> Self {
        for arg in args {
            self.cmd.arg(arg.as_str());
        }
        self
    }

    /// Set an environment variable for the spawned child process.
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.cmd.env(key, value);
        self
    }

    /// Advertise the initial PTY size that should be used for the child
    /// process.
    pub fn with_size(mut self, size: PtySize) -> Self {
        self.size = size;
        self
    }

    /// Change the working directory of the spawned child process.
    pub fn with_cwd(mut self, path: &Path) -> Self {
        self.work_dir = Some(path.to_path_buf());
        self
    }

    /// Identify the pane this session belongs to; exported to the child as
    /// `PYMUX_PANE`.
    pub fn with_pane_id(mut self, pane_id: impl Into<String>) -> Self {
        self.pane_id = Some(pane_id.into());
        self
    }

    /// Whether the pty should become the controlling terminal of the child
    /// (needed for the child to receive SIGWINCH on resize). Defaults to
    /// `true`.
    pub fn set_controlling_tty(mut self, enabled: bool) -> Self {
        self.controlling_tty = enabled;
        self
    }

    /// Spawn the configured command and return an interactive PTY session.
    pub fn spawn(mut self) -> Result<UnixSession, SessionError> {
        if let Some(pane_id) = &self.pane_id {
            self.cmd.env(PYMUX_PANE, pane_id);
        }

        let result = openpty(Some(&self.size.into()), None)?;
        let master = unsafe { File::from_raw_fd(result.master.into_raw_fd()) };
        let slave = unsafe { File::from_raw_fd(result.slave.into_raw_fd()) };
        let raw_master = master.as_raw_fd();
        let raw_slave = slave.as_raw_fd();

        let work_dir = self.work_dir;
        let controlling_tty = self.controlling_tty;

        unsafe {
            let stdin_slave = slave.try_clone()?;
            let stderr_slave = slave.try_clone()?;

            self.cmd
                .stdin(stdin_slave)
                .stderr(stderr_slave)
                .stdout(slave)
                .pre_exec(move || {
                    if libc::setsid() == -1 {
                        return Err(io::Error::last_os_error());
                    }

                    if let Some(dir) = &work_dir {
                        env::set_current_dir(dir)?;
                    }

                    if controlling_tty && libc::ioctl(0, libc::TIOCSCTTY as _, 0) == -1 {
                        return Err(io::Error::last_os_error());
                    }

                    for signo in &[
                        libc::SIGCHLD,
                        libc::SIGHUP,
                        libc::SIGINT,
                        libc::SIGQUIT,
                        libc::SIGTERM,
                        libc::SIGALRM,
                    ] {
                        libc::signal(*signo, libc::SIG_DFL);
                    }

                    libc::close(raw_master);
                    libc::close(raw_slave);

                    Ok(())
                });
        };

        let (signal_pipe, signal_pipe_id) = register_signal_handler()?;

        let child = self.cmd.spawn()?;

        set_nonblocking(raw_master)?;

        Ok(UnixSession::new(master, child, signal_pipe, signal_pipe_id))
    }
}

fn register_signal_handler() -> Result<(UnixStream, SigId), SessionError> {
    let (pipe_writer, pipe) = UnixStream::pair()?;
    let pipe_id = pipe::register(libc::SIGCHLD, pipe_writer)?;
    pipe.set_nonblocking(true)?;
    Ok((pipe, pipe_id))
}

fn set_nonblocking(raw_fd: i32) -> Result<(), SessionError> {
    unsafe {
        let flags = libc::fcntl(raw_fd, libc::F_GETFL, 0);
        let result = libc::fcntl(raw_fd, libc::F_SETFL, flags | libc::O_NONBLOCK);
        if result != 0 {
            return Err(SessionError::IO(io::Error::last_os_error()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::ErrorKind;
    use std::thread;
    use std::time::Duration;

    use super::{Session, SessionError, unix};

    fn read_output(session: &mut impl Session) -> Result<String, SessionError> {
        let mut buffer = [0u8; 1024];
        let mut collected = Vec::new();

        for _ in 0..100 {
            match session.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => {
                    collected.extend_from_slice(&buffer[..n]);
                    if n < buffer.len() {
                        break;
                    }
                },
                Err(SessionError::IO(err)) if err.kind() == ErrorKind::WouldBlock => {
                    if !collected.is_empty() {
                        break;
                    }
                    thread::sleep(Duration::from_millis(10));
                },
                Err(err) => return Err(err),
            }
        }

        Ok(String::from_utf8_lossy(&collected).into_owned())
    }

    #[test]
    fn unix_session_echoes_output() {
        let mut session = match unix("/bin/cat").spawn() {
            Ok(session) => session,
            Err(err) => {
                eprintln!("skipping test; failed to spawn pty: {err}");
                return;
            },
        };

        session.write(b"termite-test\n").expect("write payload");
        let output = read_output(&mut session).expect("read output");
        assert!(output.contains("termite-test"), "got: {output:?}");

        session.close().expect("close session");
    }

    #[test]
    fn pymux_pane_env_var_is_visible_to_child() {
        let mut session = match unix("/bin/sh")
            .with_arg("-c")
            .with_arg("printf '%s' \"$PYMUX_PANE\"")
            .with_pane_id("pane-7")
            .spawn()
        {
            Ok(session) => session,
            Err(err) => {
                eprintln!("skipping test; failed to spawn pty: {err}");
                return;
            },
        };

        let output = read_output(&mut session).expect("read output");
        assert_eq!(output.trim(), "pane-7");
        session.close().expect("close session");
    }
}
