//! Wires up a two-pane session hosting `/bin/sh` side by side, driven by a
//! single-threaded mio event loop. Demonstrates the pieces SPEC_FULL.md
//! scopes out of the core itself: raw-mode setup, SIGWINCH handling, and the
//! PTY backend.

#[cfg(unix)]
fn main() -> anyhow::Result<()> {
    unix_shell::run()
}

#[cfg(not(unix))]
fn main() {
    eprintln!("This example is only supported on Unix platforms.");
}

#[cfg(unix)]
mod unix_shell {
    use std::io::{self, Read, Write};
    use std::mem::MaybeUninit;
    use std::os::fd::{AsRawFd, BorrowedFd, RawFd};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use anyhow::{Context, Result};
    use mio::unix::SourceFd;
    use mio::{Events, Interest, Poll, Token};
    use nix::fcntl::{FcntlArg, OFlag, fcntl};
    use nix::libc;
    use nix::sys::termios::{self, SetArg};
    use signal_hook::consts::signal::SIGWINCH;
    use termite_mux::{InputDispatcher, Location, Pane, PaneId, PipeRenderer, Session, WindowId};
    use termite_pty::{Pollable, PtySize, SessionError, UnixSession, unix};

    const LEFT_IO: Token = Token(0);
    const LEFT_CHILD: Token = Token(1);
    const RIGHT_IO: Token = Token(2);
    const RIGHT_CHILD: Token = Token(3);
    const STDIN_TOKEN: Token = Token(4);

    pub fn run() -> Result<()> {
        env_logger::init();

        let stdin_fd = io::stdin().as_raw_fd();
        let stdout_fd = io::stdout().as_raw_fd();

        let _raw_guard = RawModeGuard::enable(stdin_fd)?;
        let _alt_screen_guard = AltScreenGuard::enable()?;
        let _nonblocking_guard = NonBlockingGuard::set(stdin_fd)?;

        let (rows, cols) = query_winsize(stdout_fd).context("failed to query terminal size")?;
        let mut mux = Session::new(cols as usize, rows as usize);
        let window = mux.add_window();

        let half_width = (cols as usize).saturating_sub(1) / 2;
        let body_height = (rows as usize).saturating_sub(1);

        let mut left_pty = spawn_pane(half_width, body_height)?;
        let mut right_pty = spawn_pane((cols as usize).saturating_sub(1) - half_width, body_height)?;

        let mut poll = Poll::new().context("failed to create poll instance")?;
        left_pty
            .register(poll.registry(), Interest::READABLE, LEFT_IO, LEFT_CHILD)
            .context("failed to register left pty with poll")?;
        right_pty
            .register(poll.registry(), Interest::READABLE, RIGHT_IO, RIGHT_CHILD)
            .context("failed to register right pty with poll")?;

        let mut stdin_source = SourceFd(&stdin_fd);
        poll.registry()
            .register(&mut stdin_source, STDIN_TOKEN, Interest::READABLE)
            .context("failed to register stdin with poll")?;

        let left_pane = Pane::new(
            mux.next_pane_id(),
            Box::new(left_pty),
            Location { px: 0, py: 0, sx: half_width, sy: body_height },
        );
        let left_id = left_pane.id();
        mux.active_window_mut().unwrap().add_pane(left_pane, true)?;

        let right_pane = Pane::new(
            mux.next_pane_id(),
            Box::new(right_pty),
            Location { px: half_width + 1, py: 0, sx: cols as usize - half_width - 1, sy: body_height },
        );
        let right_id = right_pane.id();
        mux.active_window_mut().unwrap().add_pane(right_pane, true)?;
        mux.active_window_mut()
            .unwrap()
            .reflow(Location { px: 0, py: 0, sx: cols as usize, sy: body_height });

        mux.add_renderer(Box::new(PipeRenderer::new(io::stdout())));
        mux.update_host_size(cols as usize, rows as usize);

        let mut dispatcher = InputDispatcher::new();
        dispatcher.bind(b'o', |session: &mut Session| session.focus_next_window());
        dispatcher.bind(b'x', |session: &mut Session| {
            let _ = session.kill_current_pane();
        });

        let (resize_tx, resize_rx) = mpsc::channel();
        thread::spawn(move || {
            let mut signals = signal_hook::iterator::Signals::new([SIGWINCH]).unwrap();
            for _ in &mut signals {
                if resize_tx.send(()).is_err() {
                    break;
                }
            }
        });

        let mut events = Events::with_capacity(128);
        let mut running = true;

        print!("\x1b[2J\x1b[?25l");
        io::stdout().flush()?;

        while running {
            poll.poll(&mut events, Some(Duration::from_millis(16))).context("event loop poll failed")?;

            for event in events.iter() {
                match event.token() {
                    LEFT_IO if event.is_readable() => drain_pane(&mut mux, window, left_id),
                    RIGHT_IO if event.is_readable() => drain_pane(&mut mux, window, right_id),
                    LEFT_CHILD | RIGHT_CHILD if event.is_readable() => {
                        running &= !child_exited(&mut mux, window, event.token());
                    },
                    STDIN_TOKEN if event.is_readable() => {
                        read_stdin(&mut mux, &mut dispatcher)?;
                    },
                    _ => {},
                }
            }

            while resize_rx.try_recv().is_ok() {
                let (rows, cols) = query_winsize(stdout_fd)?;
                mux.update_size(cols as usize, rows as usize);
                mux.update_host_size(cols as usize, rows as usize);
            }

            mux.repaint();
        }

        print!("\x1b[?25h\x1b[0m\x1b[2J\x1b[H");
        io::stdout().flush()?;
        Ok(())
    }

    fn spawn_pane(cols: usize, rows: usize) -> Result<UnixSession> {
        unix("/bin/sh")
            .with_arg("-i")
            .with_size(PtySize { rows: rows as u16, cols: cols as u16, cell_width: 0, cell_height: 0 })
            .spawn()
            .context("failed to spawn shell session")
    }

    fn drain_pane(mux: &mut Session, window: WindowId, pane_id: PaneId) {
        let mut buffer = [0u8; 8192];
        let mut chunks = Vec::new();
        {
            let Some(win) = mux.active_window_mut() else { return };
            let Some(pane) = win.panes_mut().iter_mut().find(|p| p.id() == pane_id) else { return };
            loop {
                match pane.session_mut().read(&mut buffer) {
                    Ok(0) => break,
                    Ok(n) => chunks.extend_from_slice(&buffer[..n]),
                    Err(SessionError::IO(err)) if err.kind() == io::ErrorKind::WouldBlock => break,
                    Err(SessionError::IO(err)) if err.kind() == io::ErrorKind::Interrupted => continue,
                    Err(_) => break,
                }
            }
        }
        if !chunks.is_empty() {
            mux.feed_pane(window, pane_id, &chunks);
        }
    }

    fn child_exited(mux: &mut Session, _window: WindowId, _token: Token) -> bool {
        let Some(win) = mux.active_window_mut() else { return false };
        for pane in win.panes_mut() {
            if let Ok(Some(_status)) = pane.session_mut().try_get_child_exit_status() {
                return true;
            }
        }
        false
    }

    fn read_stdin(mux: &mut Session, dispatcher: &mut InputDispatcher) -> Result<()> {
        let mut buffer = [0u8; 1024];
        loop {
            match io::stdin().read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => dispatcher.process(mux, &buffer[..n]),
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => break,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    fn query_winsize(fd: RawFd) -> Result<(u16, u16)> {
        let mut winsize = MaybeUninit::<libc::winsize>::zeroed();
        let res = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, winsize.as_mut_ptr()) };
        if res == -1 {
            return Err(io::Error::last_os_error()).context("ioctl TIOCGWINSZ");
        }
        let winsize = unsafe { winsize.assume_init() };
        let rows = if winsize.ws_row == 0 { 24 } else { winsize.ws_row };
        let cols = if winsize.ws_col == 0 { 80 } else { winsize.ws_col };
        Ok((rows, cols))
    }

    struct RawModeGuard {
        fd: RawFd,
        original: termios::Termios,
    }

    impl RawModeGuard {
        fn enable(fd: RawFd) -> Result<Self> {
            let original = termios::tcgetattr(unsafe { BorrowedFd::borrow_raw(fd) })?;
            let mut raw = original.clone();
            termios::cfmakeraw(&mut raw);
            termios::tcsetattr(unsafe { BorrowedFd::borrow_raw(fd) }, SetArg::TCSANOW, &raw)?;
            Ok(Self { fd, original })
        }
    }

    impl Drop for RawModeGuard {
        fn drop(&mut self) {
            let _ = termios::tcsetattr(unsafe { BorrowedFd::borrow_raw(self.fd) }, SetArg::TCSANOW, &self.original);
        }
    }

    /// Switches the host terminal to the alternate screen buffer for the
    /// life of the session, so the shell panes never scroll into the user's
    /// normal-screen history. Dropped before `RawModeGuard` restores cooked
    /// mode, so the trailing `print!` in `run` still lands on the normal
    /// screen the user started from.
    struct AltScreenGuard;

    impl AltScreenGuard {
        fn enable() -> Result<Self> {
            print!("\x1b[?1049h");
            io::stdout().flush()?;
            Ok(Self)
        }
    }

    impl Drop for AltScreenGuard {
        fn drop(&mut self) {
            print!("\x1b[?1049l");
            let _ = io::stdout().flush();
        }
    }

    struct NonBlockingGuard {
        fd: RawFd,
        original: OFlag,
    }

    impl NonBlockingGuard {
        fn set(fd: RawFd) -> Result<Self> {
            let flags = OFlag::from_bits_truncate(fcntl(unsafe { BorrowedFd::borrow_raw(fd) }, FcntlArg::F_GETFL)?);
            let new_flags = flags | OFlag::O_NONBLOCK;
            fcntl(unsafe { BorrowedFd::borrow_raw(fd) }, FcntlArg::F_SETFL(new_flags))?;
            Ok(Self { fd, original: flags })
        }
    }

    impl Drop for NonBlockingGuard {
        fn drop(&mut self) {
            let _ = fcntl(unsafe { BorrowedFd::borrow_raw(self.fd) }, FcntlArg::F_SETFL(self.original));
        }
    }
}
