use criterion::criterion_group;
use criterion::criterion_main;
use criterion::Criterion;
use iamsign_vault_aws::{Credential, LoginPayload, RequestSigner};

criterion_group!(benches, bench);
criterion_main!(benches);

pub fn bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("sts_get_caller_identity");

    let cred = Credential::new("access_key_id", "secret_access_key")
        .with_session_token("session_token");
    let signer = RequestSigner::new("us-east-1").with_server_id_header("vault.example.com");

    group.bench_function("sign", |b| {
        b.iter(|| signer.sign(&cred).expect("must success"))
    });

    group.bench_function("sign_and_encode", |b| {
        b.iter(|| {
            let req = signer.sign(&cred).expect("must success");
            LoginPayload::from_signed_request(&req, Some("dev")).expect("must success")
        })
    });

    group.finish();
}
