//! Static landing page.

/// The interactive search page served at `GET /`.
///
/// A fixed string, no templating: the embedded script calls `POST /search`
/// and renders the results table client-side.
pub const INDEX_HTML: &str = r#"<!doctype html>
<html><head><meta charset="utf-8"><title>NCO Search</title>
<style>
body{font-family:Arial,sans-serif;padding:16px;max-width:1100px;margin:auto}
input,button{padding:8px;font-size:14px}
table{border-collapse:collapse;margin-top:12px;width:100%}
th,td{border:1px solid #ddd;padding:8px;vertical-align:top}
th{background:#f5f5f5}
.small{color:#666;font-size:12px}
.flex{display:flex;gap:8px;align-items:center;margin:8px 0;flex-wrap:wrap}
</style></head><body>
<h3>OccuMatch AI - NCO Semantic Search</h3>
<div class="small">Search in English or Hindi. Codes are fixed-width: NCO-2015 XXXX.XXXX, NCO-2004 XXXX.XX</div>
<div class="flex">
  <input id="q" placeholder="e.g., tailor, cow herder, गाय पालने वाला" size="50"/>
  <label>Top K</label><input id="k" type="number" value="5" min="1" max="50" style="width:70px"/>
  <label>Min %</label><input id="minc" type="number" value="0" min="0" max="100" style="width:80px"/>
  <button id="go">Search</button>
</div>
<div id="status" class="small"></div>
<table id="results" style="display:none">
  <thead><tr>
    <th>NCO-2015</th><th>NCO-2004</th><th>Title</th><th>Description</th><th>Confidence</th>
  </tr></thead>
  <tbody></tbody>
</table>
<script>
const q=document.getElementById('q'),k=document.getElementById('k'),m=document.getElementById('minc'),
s=document.getElementById('status'),tbl=document.getElementById('results'),tb=tbl.querySelector('tbody');
async function search(){
  const query=q.value.trim(); if(!query){s.textContent='Enter a query.';return;}
  s.textContent='Searching...'; tb.innerHTML=''; tbl.style.display='none';
  try{
    const resp=await fetch('/search',{method:'POST',headers:{'Content-Type':'application/json'},
      body:JSON.stringify({query,k:parseInt(k.value),min_confidence:parseFloat(m.value)})});
    if(!resp.ok){s.textContent='Server error '+resp.status;return;}
    const data=await resp.json();
    if(!data.results.length){s.textContent='No results.';return;}
    for(const r of data.results){
      const tr=document.createElement('tr');
      tr.innerHTML=`<td>${r.code_current_scheme}</td><td>${r.code_legacy_scheme}</td>
        <td>${r.title}</td><td>${r.description}</td>
        <td>${r.confidence.toFixed(2)}%</td>`;
      tb.appendChild(tr);
    }
    s.textContent=''; tbl.style.display='';
  } catch(e){ s.textContent='Error: '+e.message; }
}
document.getElementById('go').addEventListener('click',search);
q.addEventListener('keydown',e=>{if(e.key==='Enter')search();});
</script>
</body></html>
"#;
