// TourBox Serial Port
// Raw termios serial channel read with libc::poll

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{Transport, TransportError};

/// A USB CDC serial port configured for the controller
#[derive(Debug)]
pub struct SerialPort {
    path: PathBuf,
    file: Option<File>,
}

impl SerialPort {
    /// Open `path` as a raw 115200 8N1 port and drop any pending input
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TransportError> {
        let path = path.as_ref().to_path_buf();
        let open_err = |source: io::Error| TransportError::Open {
            path: path.clone(),
            source,
        };

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY)
            .open(&path)
            .map_err(open_err)?;

        configure_raw(&file).map_err(open_err)?;

        log::info!("Opened serial port {}", path.display());
        Ok(Self {
            path,
            file: Some(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file(&mut self) -> Result<&mut File, TransportError> {
        self.file.as_mut().ok_or(TransportError::Disconnected)
    }
}

fn configure_raw(file: &File) -> io::Result<()> {
    let fd = file.as_raw_fd();
    // SAFETY: termios is plain data; tcgetattr fills it before any field is read.
    let mut tio: libc::termios = unsafe { std::mem::zeroed() };
    if unsafe { libc::tcgetattr(fd, &mut tio) } != 0 {
        return Err(io::Error::last_os_error());
    }

    unsafe { libc::cfmakeraw(&mut tio) };
    tio.c_cflag |= libc::CLOCAL | libc::CREAD;
    tio.c_cflag &= !(libc::CSTOPB | libc::PARENB);
    tio.c_cc[libc::VMIN] = 0;
    tio.c_cc[libc::VTIME] = 0;

    if unsafe { libc::cfsetispeed(&mut tio, libc::B115200) } != 0
        || unsafe { libc::cfsetospeed(&mut tio, libc::B115200) } != 0
    {
        return Err(io::Error::last_os_error());
    }
    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &tio) } != 0 {
        return Err(io::Error::last_os_error());
    }
    if unsafe { libc::tcflush(fd, libc::TCIFLUSH) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Wait for the descriptor to become readable. `Ok(false)` on timeout or EINTR.
fn poll_readable(fd: libc::c_int, timeout: Duration) -> Result<bool, TransportError> {
    let timeout_ms = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);
    let mut pfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };

    let poll_result = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
    if poll_result < 0 {
        let err = io::Error::last_os_error();
        // A signal landed mid-wait; the caller checks its flags and polls again
        if err.kind() == io::ErrorKind::Interrupted {
            return Ok(false);
        }
        return Err(TransportError::Io(err));
    }
    if poll_result == 0 {
        return Ok(false);
    }

    if pfd.revents & libc::POLLIN != 0 {
        return Ok(true);
    }
    if pfd.revents & (libc::POLLHUP | libc::POLLERR | libc::POLLNVAL) != 0 {
        return Err(TransportError::Disconnected);
    }
    Ok(false)
}

impl Transport for SerialPort {
    fn read_byte(&mut self, timeout: Duration) -> Result<Option<u8>, TransportError> {
        let file = self.file()?;
        if !poll_readable(file.as_raw_fd(), timeout)? {
            return Ok(None);
        }

        let mut buf = [0u8; 1];
        match file.read(&mut buf) {
            // Readable with nothing to read means the device went away
            Ok(0) => Err(TransportError::Disconnected),
            Ok(_) => Ok(Some(buf[0])),
            Err(e)
                if matches!(e.kind(), io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock) =>
            {
                Ok(None)
            }
            Err(e) => Err(TransportError::Io(e)),
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let file = self.file()?;
        file.write_all(bytes)?;
        if unsafe { libc::tcdrain(file.as_raw_fd()) } != 0 {
            return Err(TransportError::Io(io::Error::last_os_error()));
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        if self.file.take().is_some() {
            log::debug!("Closed serial port {}", self.path.display());
        }
        Ok(())
    }
}
