use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rrproto::packet::Packet;
use rrproto::qtype::{DNSWireFrame, DnsTypeHIP, DnsTypeSVCB};
use rrproto::RecordCodec;

fn svcb_decode(c: &mut Criterion) {
    // rfc9460 D.2.10
    let wire: &[u8] = b"\x00\x10\x03foo\x07example\x03org\x00\x00\x00\x00\x04\x00\x01\x00\x04\x00\x01\x00\x09\x02h2\x05h3-19\x00\x04\x00\x04\xc0\x00\x02\x01";
    c.bench_function("svcb_decode", |b| {
        b.iter(|| match DnsTypeSVCB::decode(black_box(wire), None) {
            Ok(_) => {}
            Err(err) => panic!("{}", err),
        })
    });
}

fn https_parse_line(c: &mut Criterion) {
    let codec = RecordCodec::default();
    let line = "example.com. 3600 IN HTTPS 1 svc.example.com. alpn=h2,h3 port=443 ipv4hint=192.0.2.1,192.0.2.2 ipv6hint=2001:db8::1";
    c.bench_function("https_parse_line", |b| {
        b.iter(|| match codec.parse_line(black_box(line)) {
            Ok(_) => {}
            Err(err) => panic!("{}", err),
        })
    });
}

fn hip_encode(c: &mut Criterion) {
    let hip = DnsTypeHIP::new(
        2,
        "200100107B1A74DF365639CC39F1D578",
        "AwEAAbdxyhNuSutc5EMzxTs9LBPCIkOFH8cIvM4p9+LrV4e19WzK00+CI6zBCQTdtWsuxKbWIy87UOoJTwkUs7lBu+Upr1gsNrut79ryra+bSRGQb1slImA8YVJyuIDsj7kwzG7jnERNqnWxZ48AWkskmdHaVDP4BcelrTI3rMXdXF5D",
        &["rvs1.example.com.", "rvs2.example.com."],
    )
    .unwrap();
    c.bench_function("hip_encode", |b| {
        b.iter(|| {
            let mut packet = Packet::new(true);
            match hip.encode(&mut packet) {
                Ok(_) => {}
                Err(err) => panic!("{}", err),
            }
        })
    });
}

criterion_group!(codec_benches, svcb_decode, https_parse_line, hip_encode);
criterion_main!(codec_benches);
