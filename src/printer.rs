use tracing::info;

use crate::error::PrintError;

/// Send raw bytes to the named printer. On non-Windows this function returns an error.
pub fn send_raw_to_printer(printer_name: &str, data: &[u8]) -> Result<(), PrintError> {
    #[cfg(target_os = "windows")]
    {
        use std::ffi::OsStr;
        use std::iter::once;
        use std::os::windows::ffi::OsStrExt;
        use std::ptr::null_mut;
        use winapi::shared::minwindef::DWORD;
        use winapi::shared::ntdef::LPWSTR;
        use winapi::um::winspool::*;

        let fail = |call: &'static str| PrintError::Spooler { call, printer: printer_name.to_string() };

        // convert printer name and helper strings to wide
        let wide_name: Vec<u16> = OsStr::new(printer_name).encode_wide().chain(once(0)).collect();
        let wide_doc: Vec<u16> = OsStr::new("Product barcode").encode_wide().chain(once(0)).collect();
        let wide_raw: Vec<u16> = OsStr::new("RAW").encode_wide().chain(once(0)).collect();

        unsafe {
            let mut handle: *mut winapi::ctypes::c_void = null_mut();
            if OpenPrinterW(wide_name.as_ptr() as LPWSTR, &mut handle as *mut _ as *mut _, null_mut()) == 0 {
                return Err(fail("OpenPrinterW"));
            }

            let doc_info = DOC_INFO_1W {
                pDocName: wide_doc.as_ptr() as LPWSTR,
                pOutputFile: null_mut(),
                pDatatype: wide_raw.as_ptr() as LPWSTR, // RAW data type
            };

            if StartDocPrinterW(handle as *mut _, 1, &doc_info as *const _ as *mut _) == 0 {
                ClosePrinter(handle as *mut _);
                return Err(fail("StartDocPrinterW"));
            }

            if StartPagePrinter(handle as *mut _) == 0 {
                EndDocPrinter(handle as *mut _);
                ClosePrinter(handle as *mut _);
                return Err(fail("StartPagePrinter"));
            }

            let mut written: DWORD = 0;
            let ok = WritePrinter(
                handle as *mut _,
                data.as_ptr() as *mut _,
                data.len() as DWORD,
                &mut written as *mut DWORD,
            );

            EndPagePrinter(handle as *mut _);
            EndDocPrinter(handle as *mut _);
            ClosePrinter(handle as *mut _);

            if ok == 0 {
                return Err(fail("WritePrinter"));
            }
            info!(printer = printer_name, bytes = written, "raw job spooled");
            Ok(())
        }
    }

    #[cfg(not(target_os = "windows"))]
    {
        info!(printer = printer_name, bytes = data.len(), "raw printing unavailable on this platform");
        Err(PrintError::Unsupported)
    }
}

#[cfg(all(test, not(target_os = "windows")))]
mod tests {
    use super::*;

    #[test]
    fn raw_printing_is_windows_only() {
        assert!(matches!(
            send_raw_to_printer("Zebra LP2824", b"N\r\nP1\r\n"),
            Err(PrintError::Unsupported)
        ));
    }
}
