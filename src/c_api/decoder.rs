use super::{c_to_string, size_t_to_usize};
use crate::{
    code::PolarCode,
    decoder::{
        factory::{DecoderFactory, DecoderImplementation},
        PolarDecoder,
    },
};
use libc::size_t;
use std::{
    error::Error,
    ffi::{c_char, c_void},
};

#[derive(Debug)]
struct Decoder {
    decoder: Box<dyn PolarDecoder>,
}

impl Decoder {
    fn new(n: usize, k: usize, implementation: &str) -> Result<Decoder, Box<dyn Error>> {
        let implementation: DecoderImplementation = implementation.parse()?;
        let code = PolarCode::new(n, k)?;
        Ok(Decoder {
            decoder: implementation.build_decoder(code),
        })
    }

    fn decode_f64(&self, output: &mut [u8], llrs: &[f64]) -> i32 {
        match self.decoder.decode(llrs) {
            Ok(message) if message.len() == output.len() => {
                output.copy_from_slice(&message);
                0
            }
            Ok(_) => -1,
            Err(e) => {
                tracing::warn!("decoding failed: {e}");
                -1
            }
        }
    }

    fn decode_f32(&self, output: &mut [u8], llrs: &[f32]) -> i32 {
        let llrs_f64 = llrs.iter().copied().map(f64::from).collect::<Vec<f64>>();
        self.decode_f64(output, &llrs_f64)
    }
}

#[no_mangle]
unsafe extern "C" fn polar_toolbox_decoder_ctor(
    n: size_t,
    k: size_t,
    implementation: *const c_char,
) -> *mut c_void {
    let (Some(n), Some(k)) = (size_t_to_usize(n), size_t_to_usize(k)) else {
        return std::ptr::null_mut();
    };
    let implementation = c_to_string(implementation);
    match Decoder::new(n, k, &implementation) {
        Ok(decoder) => Box::into_raw(Box::new(decoder)) as *mut c_void,
        Err(e) => {
            tracing::warn!("could not build decoder: {e}");
            std::ptr::null_mut()
        }
    }
}

#[no_mangle]
unsafe extern "C" fn polar_toolbox_decoder_dtor(decoder: *mut c_void) {
    if !decoder.is_null() {
        drop(Box::from_raw(decoder as *mut Decoder));
    }
}

#[no_mangle]
unsafe extern "C" fn polar_toolbox_decoder_decode_f64(
    decoder: *mut c_void,
    output: *mut u8,
    output_len: size_t,
    llrs: *const f64,
    llrs_len: size_t,
) -> i32 {
    let (Some(output_len), Some(llrs_len)) =
        (size_t_to_usize(output_len), size_t_to_usize(llrs_len))
    else {
        return -1;
    };
    let output = std::slice::from_raw_parts_mut(output, output_len);
    let llrs = std::slice::from_raw_parts(llrs, llrs_len);
    let decoder = &*(decoder as *const Decoder);
    decoder.decode_f64(output, llrs)
}

#[no_mangle]
unsafe extern "C" fn polar_toolbox_decoder_decode_f32(
    decoder: *mut c_void,
    output: *mut u8,
    output_len: size_t,
    llrs: *const f32,
    llrs_len: size_t,
) -> i32 {
    let (Some(output_len), Some(llrs_len)) =
        (size_t_to_usize(output_len), size_t_to_usize(llrs_len))
    else {
        return -1;
    };
    let output = std::slice::from_raw_parts_mut(output, output_len);
    let llrs = std::slice::from_raw_parts(llrs, llrs_len);
    let decoder = &*(decoder as *const Decoder);
    decoder.decode_f32(output, llrs)
}
